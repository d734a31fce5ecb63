//! Prior-history counts used to seed a [`crate::ledger::PairingLedger`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schedule::{Member, Schedule};

/// Count for one unordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairCount {
    pub a: Member,
    pub b: Member,
    pub count: u32,
}

/// Already-computed pairing and leadership counts from earlier weeks.
///
/// Unknown keys are rejected so a misspelled field is an error rather than
/// an empty history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistorySeed {
    #[serde(default)]
    pub pairs: Vec<PairCount>,
    #[serde(default)]
    pub leadership: BTreeMap<Member, u32>,
}

impl HistorySeed {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.leadership.is_empty()
    }

    /// Derive counts from a previously generated schedule.
    ///
    /// The first member of every group gains one leadership and every
    /// distinct pair inside a group gains one pairing. Pairs are emitted in
    /// sorted order with `a < b`. Repeated names inside a group are skipped
    /// rather than turned into self-pairs.
    #[must_use]
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let mut pair_counts: BTreeMap<(Member, Member), u32> = BTreeMap::new();
        let mut leadership: BTreeMap<Member, u32> = BTreeMap::new();

        for week in &schedule.weeks {
            for group in &week.groups {
                if let Some(leader) = group.leader() {
                    *leadership.entry(leader.clone()).or_insert(0) += 1;
                }
                for (a, b) in group.pairs() {
                    if a == b {
                        continue;
                    }
                    let key = if a < b {
                        (a.clone(), b.clone())
                    } else {
                        (b.clone(), a.clone())
                    };
                    *pair_counts.entry(key).or_insert(0) += 1;
                }
            }
        }

        Self {
            pairs: pair_counts
                .into_iter()
                .map(|((a, b), count)| PairCount { a, b, count })
                .collect(),
            leadership,
        }
    }
}
