// ********* Input data structures ***********

use std::fmt::Display;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// The identifier of a candidate. It must be unique within an agenda.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(s: &str) -> Self {
        CandidateId(s.to_string())
    }
}

impl From<String> for CandidateId {
    fn from(s: String) -> Self {
        CandidateId(s)
    }
}

/// A candidate of the election.
///
/// Two candidates are the same candidate if they share the same id, whatever
/// their display names are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
}

impl Candidate {
    pub fn new(id: impl Into<CandidateId>, name: impl Into<String>) -> Candidate {
        Candidate {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// The ordered set of candidates running in one election.
///
/// The order of the candidates is significant: it drives the order in which
/// the pairs of candidates are enumerated, and hence the iteration order of
/// the registry. The ids are expected to be unique. This is not checked here,
/// a duplicate id is reported when the registry gets initialized.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Agenda {
    candidates: Vec<Candidate>,
}

impl Agenda {
    pub fn new(candidates: Vec<Candidate>) -> Agenda {
        Agenda { candidates }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn contains(&self, id: &CandidateId) -> bool {
        self.candidates.iter().any(|c| c.id == *id)
    }

    pub fn get(&self, id: &CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == *id)
    }
}

/// The ranking of one voter.
///
/// Each element is a rank-group: the candidates tied at this rank. The first
/// group is the most preferred one. A candidate should appear at most once in
/// a ballot, which is enforced when the ballot gets tallied.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Ballot {
    pub ranks: Vec<Vec<Candidate>>,
}

impl Ballot {
    pub fn new(ranks: Vec<Vec<Candidate>>) -> Ballot {
        Ballot { ranks }
    }

    /// A ballot without ties: one candidate per rank, in order of preference.
    pub fn from_order(candidates: &[Candidate]) -> Ballot {
        Ballot {
            ranks: candidates.iter().map(|c| vec![c.clone()]).collect(),
        }
    }
}

/// A ballot that stands for `count` identical ballots.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct WeightedBallot {
    pub ballot: Ballot,
    pub count: u64,
}

impl WeightedBallot {
    pub fn new(ballot: Ballot, count: u64) -> WeightedBallot {
        WeightedBallot { ballot, count }
    }
}

// ******** Output data structures *********

/// The support of one candidate over another one.
///
/// `value` is the number of ballots (accounting for their weights) that
/// rank the winner strictly above the loser. It starts at zero and only
/// grows, through the registry that owns this tally.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PairTally {
    winner: Candidate,
    loser: Candidate,
    pub(crate) value: u64,
}

impl PairTally {
    pub fn new(winner: Candidate, loser: Candidate) -> PairTally {
        PairTally {
            winner,
            loser,
            value: 0,
        }
    }

    pub fn winner(&self) -> &Candidate {
        &self.winner
    }

    pub fn loser(&self) -> &Candidate {
        &self.loser
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

/// The outcome of comparing two candidates on one ballot.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct PairOutcome<'a> {
    pub winner: &'a Candidate,
    pub loser: &'a Candidate,
}

/// Errors that prevent the tally from completing successfully.
///
/// They all indicate inputs breaking the contract of the tally: none of them
/// is transient.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TallyError {
    #[snafu(display(
        "Candidate {candidate} appears more than once in the ballot (ranks {first_rank} and {second_rank})"
    ))]
    DuplicateCandidate {
        candidate: CandidateId,
        first_rank: usize,
        second_rank: usize,
    },

    #[snafu(display("Candidate {candidate} is not ranked in the ballot"))]
    UnrankedCandidate { candidate: CandidateId },

    #[snafu(display("No tally registered for the pair ({winner}, {loser})"))]
    PairNotFound {
        winner: CandidateId,
        loser: CandidateId,
    },

    #[snafu(display("Candidate {candidate} is not part of the agenda"))]
    CandidateNotFound { candidate: CandidateId },

    #[snafu(display("The pair ({winner}, {loser}) is already registered"))]
    DuplicatePair {
        winner: CandidateId,
        loser: CandidateId,
    },

    #[snafu(display("Cannot register a tally of candidate {candidate} against itself"))]
    SelfPair { candidate: CandidateId },

    #[snafu(display("The tally for the pair ({winner}, {loser}) overflowed"))]
    CountOverflow {
        winner: CandidateId,
        loser: CandidateId,
    },

    #[snafu(display("The candidates must be declared before adding ballots"))]
    MissingAgenda {},
}

pub type TallyResult<T> = Result<T, TallyError>;

// ********* Configuration **********

/// What to do with a pair of candidates when a ballot does not rank one of them.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnrankedCandidateMode {
    /// The ballot expresses no preference for this pair. Nothing is counted.
    Skip,
    /// The ballot is rejected with `TallyError::UnrankedCandidate`.
    Fail,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TallyRules {
    #[serde(rename = "unrankedCandidateMode")]
    pub unranked_candidate_mode: UnrankedCandidateMode,
}

impl TallyRules {
    pub const DEFAULT_RULES: TallyRules = TallyRules {
        unranked_candidate_mode: UnrankedCandidateMode::Skip,
    };
}

impl Default for TallyRules {
    fn default() -> Self {
        TallyRules::DEFAULT_RULES
    }
}
