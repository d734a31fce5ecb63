//! Greedy member selection for a group under construction.
//!
//! The candidate whose summed pairing count against the group-so-far is
//! strictly smallest wins. Ties go to the earliest candidate in
//! `available`, so the roster shuffle is the only tie-break entropy.

use tracing::trace;

use crate::ledger::PairingLedger;
use crate::schedule::Member;

/// Pick the next member to add to `current_group`.
///
/// Returns the index into `available` of the chosen candidate, or `None`
/// when `available` is empty. The caller removes the member from its pool.
#[must_use]
pub fn select_next(
    ledger: &PairingLedger,
    available: &[Member],
    current_group: &[Member],
) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;

    for (idx, candidate) in available.iter().enumerate() {
        let score = ledger.pairing_total(candidate, current_group);
        // Strict comparison keeps the first minimal candidate.
        if best.is_none_or(|(_, best_score)| score < best_score) {
            best = Some((idx, score));
        }
    }

    if let Some((idx, score)) = best {
        trace!(member = %available[idx], score, "selected next member");
    }
    best.map(|(idx, _)| idx)
}
