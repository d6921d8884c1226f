use log::debug;
use serde::{Serialize, Serializer};
use snafu::{ensure, OptionExt};

use std::collections::HashMap;

use crate::config::*;

// Position of each tally, by winner id then loser id.
type PairIndex = HashMap<CandidateId, HashMap<CandidateId, usize>>;

/// The tallies of all the ordered pairs of candidates of an agenda.
///
/// Every ordered pair is registered exactly once. Entries are never removed
/// and only their values change, always upwards. Iteration follows the order
/// of registration.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PairTallyRegistry {
    tallies: Vec<PairTally>,
    index: PairIndex,
}

impl PairTallyRegistry {
    pub fn new() -> PairTallyRegistry {
        PairTallyRegistry::default()
    }

    /// Registers a new tally, keyed by its (winner, loser) pair.
    pub fn register(&mut self, tally: PairTally) -> TallyResult<()> {
        let winner = tally.winner().id.clone();
        let loser = tally.loser().id.clone();
        ensure!(winner != loser, SelfPairSnafu { candidate: winner });
        ensure!(
            self.position(&winner, &loser).is_none(),
            DuplicatePairSnafu { winner, loser }
        );
        self.index
            .entry(winner)
            .or_default()
            .insert(loser, self.tallies.len());
        self.tallies.push(tally);
        Ok(())
    }

    pub fn get(&self, winner: &Candidate, loser: &Candidate) -> TallyResult<&PairTally> {
        let idx = self.slot(winner, loser)?;
        Ok(&self.tallies[idx])
    }

    /// The support of `winner` over `loser`.
    pub fn value(&self, winner: &Candidate, loser: &Candidate) -> TallyResult<u64> {
        self.get(winner, loser).map(|t| t.value())
    }

    pub fn contains(&self, winner: &Candidate, loser: &Candidate) -> bool {
        self.position(&winner.id, &loser.id).is_some()
    }

    /// Adds `amount` to the support of `winner` over `loser`.
    pub fn increment(
        &mut self,
        winner: &Candidate,
        loser: &Candidate,
        amount: u64,
    ) -> TallyResult<()> {
        let idx = self.slot(winner, loser)?;
        self.apply(&[idx], amount)
    }

    /// Adds all the values of another registry to this one.
    ///
    /// Every pair of `other` must be registered here. Either all the values
    /// are added, or none is.
    pub fn merge(&mut self, other: &PairTallyRegistry) -> TallyResult<()> {
        let mut updates: Vec<(usize, u64)> = Vec::with_capacity(other.len());
        for t in other.iter() {
            let idx = self.slot(t.winner(), t.loser())?;
            let current = self.tallies[idx].value;
            let updated = current.checked_add(t.value()).with_context(|| CountOverflowSnafu {
                winner: t.winner().id.clone(),
                loser: t.loser().id.clone(),
            })?;
            updates.push((idx, updated));
        }
        debug!("merge: {} tallies updated", updates.len());
        for (idx, updated) in updates {
            self.tallies[idx].value = updated;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PairTally> {
        self.tallies.iter()
    }

    // The position of the tally for this pair.
    pub(crate) fn slot(&self, winner: &Candidate, loser: &Candidate) -> TallyResult<usize> {
        self.position(&winner.id, &loser.id)
            .with_context(|| PairNotFoundSnafu {
                winner: winner.id.clone(),
                loser: loser.id.clone(),
            })
    }

    // Looks up by borrowed ids: nothing is allocated on the tally path.
    fn position(&self, winner: &CandidateId, loser: &CandidateId) -> Option<usize> {
        self.index.get(winner)?.get(loser).copied()
    }

    // Adds the same amount to all the given slots. A slot may appear several times.
    // Nothing is written if one of the sums overflows.
    pub(crate) fn apply(&mut self, slots: &[usize], amount: u64) -> TallyResult<()> {
        if amount == 0 {
            return Ok(());
        }
        let mut pending: HashMap<usize, u64> = HashMap::new();
        for &idx in slots {
            let current = pending.get(&idx).copied().unwrap_or(self.tallies[idx].value);
            let t = &self.tallies[idx];
            let updated = current.checked_add(amount).with_context(|| CountOverflowSnafu {
                winner: t.winner().id.clone(),
                loser: t.loser().id.clone(),
            })?;
            pending.insert(idx, updated);
        }
        for (idx, updated) in pending {
            self.tallies[idx].value = updated;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a PairTallyRegistry {
    type Item = &'a PairTally;
    type IntoIter = std::slice::Iter<'a, PairTally>;

    fn into_iter(self) -> Self::IntoIter {
        self.tallies.iter()
    }
}

// The registry is exported as the list of its tallies, in registration order.
impl Serialize for PairTallyRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tallies.iter())
    }
}
