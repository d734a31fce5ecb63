//! Leader rotation for a finalized group.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::trace;

use crate::error::InvariantViolation;
use crate::ledger::PairingLedger;
use crate::schedule::{Group, Member};

/// Choose a leader for `group` and fold the group into the ledger.
///
/// The leader is drawn uniformly from the members with the lowest
/// leadership count, measured before this call. The chosen member is
/// swapped into position 0 (the order of the rest is not preserved), its
/// leadership count is incremented, and every distinct pair in the final
/// group gains one pairing.
///
/// # Errors
///
/// - [`InvariantViolation::EmptyGroup`] if `group` has no members.
/// - [`InvariantViolation::SelfPairing`] if `group` holds the same member
///   twice. Pairings recorded before the duplicate is reached stay applied;
///   callers treat this as fatal to the run.
/// - [`InvariantViolation::LeadershipOverflow`] or
///   [`InvariantViolation::PairCountOverflow`] when a count is saturated,
///   which only a hand-edited history can cause. Also fatal.
pub fn select_leader<R: Rng + ?Sized>(
    ledger: &mut PairingLedger,
    group: &mut Group,
    rng: &mut R,
) -> Result<Member, InvariantViolation> {
    let min_leadership = group
        .members()
        .iter()
        .map(|member| ledger.leadership_count(member))
        .min()
        .ok_or(InvariantViolation::EmptyGroup)?;

    let eligible: Vec<usize> = group
        .members()
        .iter()
        .enumerate()
        .filter(|(_, member)| ledger.leadership_count(member) == min_leadership)
        .map(|(idx, _)| idx)
        .collect();

    let leader_idx = *eligible.choose(rng).ok_or(InvariantViolation::EmptyGroup)?;
    group.swap_to_front(leader_idx);

    let leader = group.members()[0].clone();
    ledger.record_leadership(&leader)?;
    trace!(%leader, eligible = eligible.len(), min_leadership, "selected leader");

    for (a, b) in group.pairs() {
        ledger.record_pairing(a, b)?;
    }

    Ok(leader)
}
