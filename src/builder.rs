pub use crate::config::*;
use crate::{PairTallyRegistry, TallyEngine};

use snafu::{ensure, OptionExt};

/// A builder for adding ballots by candidate id.
///
/// Using the builder should be considered for quick experiments and tests.
/// Performance code should assemble the `WeightedBallot`s directly.
///
/// ```
/// pub use tideman_tally::builder::Builder;
/// pub use tideman_tally::TallyRules;
/// # use tideman_tally::TallyError;
///
/// let mut builder = Builder::new(&TallyRules::DEFAULT_RULES)?
///     .candidates(&["Anna".to_string(), "Bob".to_string(), "Clara".to_string()])?;
///
/// builder.add_vote_simple(&["Anna".to_string(), "Clara".to_string()])?;
/// builder.add_vote(&[vec!["Bob".to_string(), "Clara".to_string()], vec!["Anna".to_string()]], 2)?;
///
/// let registry = builder.tally()?;
/// assert_eq!(registry.len(), 6);
///
/// # Ok::<(), TallyError>(())
/// ```
pub struct Builder {
    pub(crate) _rules: TallyRules,
    pub(crate) _agenda: Option<Agenda>,
    pub(crate) _ballots: Vec<WeightedBallot>,
}

impl Builder {
    pub fn new(rules: &TallyRules) -> Result<Builder, TallyError> {
        Ok(Builder {
            _rules: rules.clone(),
            _agenda: None,
            _ballots: Vec::new(),
        })
    }

    /// Declares the candidates, using their names as ids.
    ///
    /// Replaces the previous candidates and drops the ballots added so far.
    pub fn candidates(self, names: &[String]) -> Result<Builder, TallyError> {
        let entries: Vec<(String, String)> =
            names.iter().map(|n| (n.clone(), n.clone())).collect();
        self.candidate_entries(&entries)
    }

    /// Declares the candidates as (id, name) pairs.
    pub fn candidate_entries(self, entries: &[(String, String)]) -> Result<Builder, TallyError> {
        Ok(Builder {
            _rules: self._rules,
            _agenda: Some(Agenda::new(
                entries
                    .iter()
                    .map(|(id, name)| Candidate::new(id.as_str(), name.as_str()))
                    .collect(),
            )),
            _ballots: Vec::new(),
        })
    }

    /// Adds a vote without ties and with a count of 1.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_vote_simple(&mut self, candidates: &[String]) -> Result<(), TallyError> {
        let ranks: Vec<Vec<String>> = candidates.iter().map(|c| vec![c.clone()]).collect();
        self.add_vote(&ranks, 1)
    }

    /// Adds a vote, with a weight attached to it.
    ///
    /// ranks: the rank-groups of the voter, most preferred first. The
    /// candidates of one group are tied. Empty groups are dropped.
    pub fn add_vote(&mut self, ranks: &[Vec<String>], count: u64) -> Result<(), TallyError> {
        let agenda = self._agenda.as_ref().context(MissingAgendaSnafu {})?;
        let mut groups: Vec<Vec<Candidate>> = Vec::new();
        for group in ranks.iter().filter(|g| !g.is_empty()) {
            let mut cands: Vec<Candidate> = Vec::new();
            for id in group {
                let cid = CandidateId::from(id.as_str());
                let c = agenda
                    .get(&cid)
                    .context(CandidateNotFoundSnafu { candidate: cid.clone() })?;
                cands.push(c.clone());
            }
            groups.push(cands);
        }
        self._ballots
            .push(WeightedBallot::new(Ballot::new(groups), count));
        Ok(())
    }

    /// Adds a ballot that is already assembled. Every candidate it ranks must
    /// be in the agenda.
    pub fn add_weighted_ballot(&mut self, ballot: &WeightedBallot) -> Result<(), TallyError> {
        let agenda = self._agenda.as_ref().context(MissingAgendaSnafu {})?;
        for c in ballot.ballot.ranks.iter().flatten() {
            ensure!(
                agenda.contains(&c.id),
                CandidateNotFoundSnafu {
                    candidate: c.id.clone()
                }
            );
        }
        self._ballots.push(ballot.clone());
        Ok(())
    }

    pub fn agenda(&self) -> Option<&Agenda> {
        self._agenda.as_ref()
    }

    pub fn ballots(&self) -> &[WeightedBallot] {
        &self._ballots
    }

    /// Runs the pairwise tally over all the ballots added so far.
    pub fn tally(&self) -> Result<PairTallyRegistry, TallyError> {
        let agenda = self._agenda.as_ref().context(MissingAgendaSnafu {})?;
        TallyEngine::new(&self._rules).calculate(agenda, &self._ballots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn votes_need_candidates() {
        let mut builder = Builder::new(&TallyRules::DEFAULT_RULES).unwrap();
        assert_eq!(
            builder.add_vote_simple(&names(&["A"])),
            Err(TallyError::MissingAgenda {})
        );
        assert!(matches!(builder.tally(), Err(TallyError::MissingAgenda {})));
    }

    #[test]
    fn unknown_candidate_is_rejected() {
        let mut builder = Builder::new(&TallyRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&names(&["A", "B"]))
            .unwrap();
        assert_eq!(
            builder.add_vote_simple(&names(&["A", "Z"])),
            Err(TallyError::CandidateNotFound {
                candidate: "Z".into()
            })
        );
        assert!(builder.ballots().is_empty());
    }

    #[test]
    fn foreign_weighted_ballot_is_rejected() {
        let mut builder = Builder::new(&TallyRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&names(&["A", "B"]))
            .unwrap();
        let foreign = WeightedBallot::new(
            Ballot::from_order(&[Candidate::new("A", "A"), Candidate::new("Z", "Z")]),
            1,
        );
        assert_eq!(
            builder.add_weighted_ballot(&foreign),
            Err(TallyError::CandidateNotFound {
                candidate: "Z".into()
            })
        );
        assert!(builder.ballots().is_empty());

        let valid = WeightedBallot::new(
            Ballot::from_order(&[Candidate::new("B", "B"), Candidate::new("A", "A")]),
            3,
        );
        builder.add_weighted_ballot(&valid).unwrap();
        assert_eq!(builder.ballots().len(), 1);
        let registry = builder.tally().unwrap();
        assert_eq!(
            registry.value(&Candidate::new("B", "B"), &Candidate::new("A", "A")),
            Ok(3)
        );
    }

    #[test]
    fn tally_with_entries() {
        let mut builder = Builder::new(&TallyRules::DEFAULT_RULES)
            .unwrap()
            .candidate_entries(&[
                ("A".to_string(), "Alice".to_string()),
                ("B".to_string(), "Bob".to_string()),
                ("C".to_string(), "Carol".to_string()),
            ])
            .unwrap();
        builder.add_vote_simple(&names(&["A", "B", "C"])).unwrap();
        builder
            .add_vote(&[names(&["C"]), vec![], names(&["A", "B"])], 4)
            .unwrap();
        assert_eq!(builder.ballots()[1].ballot.ranks.len(), 2);

        let registry = builder.tally().unwrap();
        let agenda = builder.agenda().unwrap();
        let c = move |id: &str| agenda.get(&id.into()).unwrap();
        assert_eq!(c("A").name, "Alice");
        assert_eq!(registry.value(c("A"), c("B")), Ok(1));
        assert_eq!(registry.value(c("B"), c("A")), Ok(0));
        assert_eq!(registry.value(c("C"), c("A")), Ok(4));
        assert_eq!(registry.value(c("A"), c("C")), Ok(1));
        assert_eq!(registry.value(c("C"), c("B")), Ok(4));
        assert_eq!(registry.value(c("B"), c("C")), Ok(1));
    }

    #[test]
    fn duplicate_vote_fails_at_tally_time() {
        let mut builder = Builder::new(&TallyRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&names(&["A", "B"]))
            .unwrap();
        builder
            .add_vote(&[names(&["A"]), names(&["B", "A"])], 1)
            .unwrap();
        assert!(matches!(
            builder.tally(),
            Err(TallyError::DuplicateCandidate { .. })
        ));
    }
}
