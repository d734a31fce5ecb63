//! Pairing and leadership counters shared across a scheduling run.
//!
//! # Invariants
//!
//! - `pairing_count(a, b) == pairing_count(b, a)` for every pair at all
//!   times; every mutation writes both directions.
//! - A member is never paired with itself.
//!
//! One ledger belongs to exactly one run. Independent runs (see
//! [`crate::campaign`]) each build their own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::InvariantViolation;
use crate::history::HistorySeed;
use crate::schedule::Member;

/// Mutable co-occurrence and leadership counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingLedger {
    pairings: BTreeMap<Member, BTreeMap<Member, u32>>,
    leadership: BTreeMap<Member, u32>,
}

impl PairingLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger pre-loaded with prior history.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::SelfPairing`] if the seed pairs a member
    /// with itself.
    pub fn seeded(history: &HistorySeed) -> Result<Self, InvariantViolation> {
        let mut ledger = Self::new();
        ledger.seed(history)?;
        Ok(ledger)
    }

    /// Record that `a` and `b` shared a group once more.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::SelfPairing`] when `a == b`, or
    /// [`InvariantViolation::PairCountOverflow`] if the count is already
    /// `u32::MAX`. The ledger is left untouched either way.
    pub fn record_pairing(&mut self, a: &Member, b: &Member) -> Result<(), InvariantViolation> {
        self.add_pairings(a, b, 1)
    }

    /// Current count for the pair, `0` if never seen.
    #[must_use]
    pub fn pairing_count(&self, a: &Member, b: &Member) -> u32 {
        self.pairings
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of `pairing_count(candidate, m)` over every `m` in `others`.
    #[must_use]
    pub fn pairing_total<'a>(
        &self,
        candidate: &Member,
        others: impl IntoIterator<Item = &'a Member>,
    ) -> u64 {
        let Some(row) = self.pairings.get(candidate) else {
            return 0;
        };
        others
            .into_iter()
            .map(|other| u64::from(row.get(other).copied().unwrap_or(0)))
            .sum()
    }

    /// Record that `member` led a group once more.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::LeadershipOverflow`] if the count is
    /// already `u32::MAX`; the ledger is left untouched.
    pub fn record_leadership(&mut self, member: &Member) -> Result<(), InvariantViolation> {
        self.add_leadership(member, 1)
    }

    /// Times `member` has led a group, `0` if never.
    #[must_use]
    pub fn leadership_count(&self, member: &Member) -> u32 {
        self.leadership.get(member).copied().unwrap_or(0)
    }

    /// Bulk-load counts derived from a prior schedule.
    ///
    /// Each seed entry is an unordered pair and is added to both directions.
    /// Seeding adds to whatever is already recorded.
    ///
    /// # Errors
    ///
    /// - [`InvariantViolation::SelfPairing`] if an entry names the same
    ///   member twice.
    /// - [`InvariantViolation::PairCountOverflow`] or
    ///   [`InvariantViolation::LeadershipOverflow`] if a count would exceed
    ///   `u32::MAX`.
    ///
    /// On error nothing from `history` is applied.
    pub fn seed(&mut self, history: &HistorySeed) -> Result<(), InvariantViolation> {
        let mut staged = self.clone();
        for pair in &history.pairs {
            staged.add_pairings(&pair.a, &pair.b, pair.count)?;
        }
        for (member, &count) in &history.leadership {
            staged.add_leadership(member, count)?;
        }
        *self = staged;
        Ok(())
    }

    /// Verify that every stored count has a matching mirror entry.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation::LedgerAsymmetry`] found.
    pub fn check_symmetry(&self) -> Result<(), InvariantViolation> {
        for (a, row) in &self.pairings {
            for (b, &forward) in row {
                let backward = self.pairing_count(b, a);
                if forward != backward {
                    return Err(InvariantViolation::LedgerAsymmetry {
                        a: a.clone(),
                        b: b.clone(),
                        forward,
                        backward,
                    });
                }
            }
        }
        Ok(())
    }

    /// Every recorded unordered pair as `(a, b, count)` with `a < b`.
    pub fn pairs(&self) -> impl Iterator<Item = (&Member, &Member, u32)> {
        self.pairings.iter().flat_map(|(a, row)| {
            row.iter()
                .filter(move |(b, _)| a < *b)
                .map(move |(b, &count)| (a, b, count))
        })
    }

    /// Serializable copy of the ledger for downstream consumers.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            pairs: self
                .pairs()
                .map(|(a, b, count)| crate::history::PairCount {
                    a: a.clone(),
                    b: b.clone(),
                    count,
                })
                .collect(),
            leadership: self.leadership.clone(),
        }
    }

    fn add_pairings(&mut self, a: &Member, b: &Member, count: u32) -> Result<(), InvariantViolation> {
        if a == b {
            return Err(InvariantViolation::SelfPairing { member: a.clone() });
        }
        if count == 0 {
            return Ok(());
        }
        // Both directions always hold the same value, so one check covers both.
        let updated = self
            .pairing_count(a, b)
            .checked_add(count)
            .ok_or_else(|| InvariantViolation::PairCountOverflow {
                a: a.clone(),
                b: b.clone(),
            })?;
        self.pairings
            .entry(a.clone())
            .or_default()
            .insert(b.clone(), updated);
        self.pairings
            .entry(b.clone())
            .or_default()
            .insert(a.clone(), updated);
        trace!(%a, %b, count, "recorded pairing");
        Ok(())
    }

    fn add_leadership(&mut self, member: &Member, count: u32) -> Result<(), InvariantViolation> {
        let updated = self
            .leadership_count(member)
            .checked_add(count)
            .ok_or_else(|| InvariantViolation::LeadershipOverflow {
                member: member.clone(),
            })?;
        self.leadership.insert(member.clone(), updated);
        Ok(())
    }
}

/// Final counts in a stable, serializable shape.
///
/// Has the same layout as [`HistorySeed`], so a snapshot can seed a later run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub pairs: Vec<crate::history::PairCount>,
    pub leadership: BTreeMap<Member, u32>,
}

impl From<LedgerSnapshot> for HistorySeed {
    fn from(snapshot: LedgerSnapshot) -> Self {
        Self {
            pairs: snapshot.pairs,
            leadership: snapshot.leadership,
        }
    }
}
