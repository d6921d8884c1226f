/*!
Pairwise preference tallies for ranked pairs (Tideman) elections.

For every ordered pair of distinct candidates (A, B) of an agenda, the tally
counts the ballots (with their weights) that rank A strictly above B. This is
the input of the later stages of the ranked pairs method (margins, graph
locking, winner selection), which are not part of this crate.

```
use tideman_tally::*;

let alice = Candidate::new("A", "Alice");
let bob = Candidate::new("B", "Bob");
let carol = Candidate::new("C", "Carol");
let agenda = Agenda::new(vec![alice.clone(), bob.clone(), carol.clone()]);

let ballots = vec![WeightedBallot::new(
    Ballot::from_order(&[alice.clone(), bob.clone(), carol.clone()]),
    3,
)];

let registry = TallyEngine::default().calculate(&agenda, &ballots)?;
assert_eq!(registry.value(&alice, &bob)?, 3);
assert_eq!(registry.value(&bob, &alice)?, 0);
# Ok::<(), TallyError>(())
```

See the [manual] for the details of the rules.
*/

mod config;
mod registry;

pub mod builder;
pub mod manual;

use log::{debug, info, warn};
use snafu::{ensure, OptionExt};

use std::collections::HashMap;

pub use crate::config::*;
pub use crate::registry::PairTallyRegistry;

/// The rank of every candidate of a ballot. 0 is the most preferred rank.
pub type RankMap = HashMap<CandidateId, usize>;

/// Computes the pairwise tallies of an election.
///
/// The engine holds no state besides its rules: the same engine can run any
/// number of independent calculations.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TallyEngine {
    rules: TallyRules,
}

impl TallyEngine {
    pub fn new(rules: &TallyRules) -> TallyEngine {
        TallyEngine {
            rules: rules.clone(),
        }
    }

    pub fn rules(&self) -> &TallyRules {
        &self.rules
    }

    /// All the ordered pairs of distinct candidates, in agenda order for both
    /// positions. For N candidates, there are N(N-1) pairs.
    pub fn ordered_pairs(agenda: &Agenda) -> impl Iterator<Item = (&Candidate, &Candidate)> {
        let candidates = agenda.candidates();
        candidates.iter().flat_map(move |outer| {
            candidates
                .iter()
                .filter(move |inner| inner.id != outer.id)
                .map(move |inner| (outer, inner))
        })
    }

    /// Creates a registry with a zero tally for every ordered pair of the agenda.
    pub fn initialize(&self, agenda: &Agenda) -> TallyResult<PairTallyRegistry> {
        let mut registry = PairTallyRegistry::new();
        for (outer, inner) in TallyEngine::ordered_pairs(agenda) {
            registry.register(PairTally::new(outer.clone(), inner.clone()))?;
        }
        debug!(
            "initialize: {} candidates, {} tallies",
            agenda.len(),
            registry.len()
        );
        Ok(registry)
    }

    /// Maps every candidate of the ballot to its rank.
    ///
    /// Candidates in the same rank-group share the same rank. A ballot that
    /// mentions a candidate twice is rejected.
    pub fn rank_map_of(ballot: &Ballot) -> TallyResult<RankMap> {
        let mut ranks: RankMap = HashMap::new();
        for (rank, group) in ballot.ranks.iter().enumerate() {
            for candidate in group.iter() {
                if let Some(&first_rank) = ranks.get(&candidate.id) {
                    return DuplicateCandidateSnafu {
                        candidate: candidate.id.clone(),
                        first_rank,
                        second_rank: rank,
                    }
                    .fail();
                }
                ranks.insert(candidate.id.clone(), rank);
            }
        }
        Ok(ranks)
    }

    /// Compares two candidates on one ballot.
    ///
    /// The candidate with the lower rank wins. Returns `None` if both are tied.
    /// Both candidates must be ranked on the ballot.
    pub fn resolve_pair_winner<'a>(
        a: &'a Candidate,
        b: &'a Candidate,
        ranks: &RankMap,
    ) -> TallyResult<Option<PairOutcome<'a>>> {
        let rank_a = *ranks.get(&a.id).with_context(|| UnrankedCandidateSnafu {
            candidate: a.id.clone(),
        })?;
        let rank_b = *ranks.get(&b.id).with_context(|| UnrankedCandidateSnafu {
            candidate: b.id.clone(),
        })?;
        let outcome = if rank_a < rank_b {
            Some(PairOutcome {
                winner: a,
                loser: b,
            })
        } else if rank_b < rank_a {
            Some(PairOutcome {
                winner: b,
                loser: a,
            })
        } else {
            None
        };
        Ok(outcome)
    }

    /// Adds the preferences of one weighted ballot to the registry.
    ///
    /// If the ballot is rejected, the registry is left unchanged.
    pub fn tally_ballot(
        &self,
        weighted_ballot: &WeightedBallot,
        registry: &mut PairTallyRegistry,
        agenda: &Agenda,
    ) -> TallyResult<()> {
        let ranks = TallyEngine::rank_map_of(&weighted_ballot.ballot)?;
        debug!("tally_ballot: ranks: {:?}", ranks);
        for cid in ranks.keys() {
            ensure!(
                agenda.contains(cid),
                CandidateNotFoundSnafu {
                    candidate: cid.clone()
                }
            );
        }
        if self.rules.unranked_candidate_mode == UnrankedCandidateMode::Fail {
            // Also covers the agendas too small to have any pair.
            for c in agenda.candidates() {
                ensure!(
                    ranks.contains_key(&c.id),
                    UnrankedCandidateSnafu {
                        candidate: c.id.clone()
                    }
                );
            }
        }

        // Collect all the slots first so that a failure does not leave a partial count.
        let mut slots: Vec<usize> = Vec::new();
        for (outer, inner) in TallyEngine::ordered_pairs(agenda) {
            let both_ranked = ranks.contains_key(&outer.id) && ranks.contains_key(&inner.id);
            if !both_ranked && self.rules.unranked_candidate_mode == UnrankedCandidateMode::Skip {
                continue;
            }
            // The reverse visit (inner, outer) has the same outcome: only count it from the winner's side.
            match TallyEngine::resolve_pair_winner(outer, inner, &ranks)? {
                Some(outcome) if outcome.winner.id == outer.id => {
                    slots.push(registry.slot(outcome.winner, outcome.loser)?);
                }
                _ => {}
            }
        }

        if weighted_ballot.count == 0 {
            debug!("tally_ballot: skipping ballot with a zero count");
            return Ok(());
        }
        registry.apply(&slots, weighted_ballot.count)
    }

    /// Computes the pairwise tallies for all the ballots.
    ///
    /// The first rejected ballot aborts the calculation.
    pub fn calculate(
        &self,
        agenda: &Agenda,
        ballots: &[WeightedBallot],
    ) -> TallyResult<PairTallyRegistry> {
        info!(
            "Processing {:?} weighted ballots, {:?} candidates, rules: {:?}",
            ballots.len(),
            agenda.len(),
            self.rules
        );
        for c in agenda.candidates() {
            info!("Candidate: {}: {}", c.id, c.name);
        }

        let mut registry = self.initialize(agenda)?;
        for (idx, wb) in ballots.iter().enumerate() {
            if let Err(e) = self.tally_ballot(wb, &mut registry, agenda) {
                warn!("calculate: ballot #{} rejected: {}", idx, e);
                return Err(e);
            }
        }
        info!(
            "Processed {:?} ballots with a total weight of {:?}",
            ballots.len(),
            ballots
                .iter()
                .fold(0u64, |acc, wb| acc.saturating_add(wb.count))
        );
        Ok(registry)
    }
}

/// Runs the pairwise tally with the given rules for the given ballots.
///
/// Arguments:
/// * `ballots` the weighted ballots to count
/// * `agenda` the candidates of this election
/// * `rules` the rules that govern this tally
pub fn run_pairwise_tally(
    ballots: &[WeightedBallot],
    agenda: &Agenda,
    rules: &TallyRules,
) -> TallyResult<PairTallyRegistry> {
    TallyEngine::new(rules).calculate(agenda, ballots)
}
