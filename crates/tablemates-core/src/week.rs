//! One week's partition of the roster into groups.
//!
//! # Algorithm
//!
//! 1. Shuffle the roster in place. The new order carries over to the next
//!    week; it is the tie-break order for [`select_next`].
//! 2. Form `floor(roster / group_size)` groups greedily, one member at a
//!    time, each pick minimizing repeat dinners with the group-so-far.
//! 3. Hand the `roster % group_size` leftovers out one per group, starting
//!    from the first group. Some groups end up one member larger (more only
//!    when leftovers outnumber groups), never with a standalone runt group.
//!    When no full group can be formed the whole roster becomes one group.
//! 4. Check the partition, then pick each group's leader, which also records
//!    the week's pairings.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::builder::select_next;
use crate::error::ScheduleError;
use crate::leader::select_leader;
use crate::ledger::PairingLedger;
use crate::oracle::partition_violations;
use crate::schedule::{Group, Member, WeekAssignment};

/// Schedule a single week.
///
/// `week` is the 1-based week number used in diagnostics.
///
/// # Errors
///
/// - [`ScheduleError::EmptyRoster`] and [`ScheduleError::InvalidGroupSize`]
///   for degenerate input.
/// - [`ScheduleError::Invariant`] if the partition is broken (e.g. the roster
///   holds a duplicate name) or a leader cannot be assigned.
#[instrument(level = "debug", skip(ledger, roster, rng), fields(roster = roster.len()))]
pub fn schedule_week<R: Rng + ?Sized>(
    ledger: &mut PairingLedger,
    roster: &mut [Member],
    group_size: usize,
    week: usize,
    rng: &mut R,
) -> Result<WeekAssignment, ScheduleError> {
    if roster.is_empty() {
        return Err(ScheduleError::EmptyRoster);
    }
    if group_size == 0 {
        return Err(ScheduleError::InvalidGroupSize(group_size));
    }

    roster.shuffle(rng);

    let max_groups = roster.len() / group_size;
    let mut available: Vec<Member> = roster.to_vec();
    let mut groups: Vec<Group> = Vec::with_capacity(max_groups.max(1));

    while !available.is_empty() && groups.len() < max_groups {
        let mut group = Group::with_capacity(group_size + 1);
        while group.len() < group_size {
            let Some(idx) = select_next(ledger, &available, group.members()) else {
                break;
            };
            group.push(available.remove(idx));
        }
        groups.push(group);
    }

    let leftovers = available.len();
    if groups.is_empty() {
        groups.push(Group::new(std::mem::take(&mut available)));
    } else {
        distribute_leftovers(&mut groups, available);
    }
    debug!(week, groups = groups.len(), leftovers, "formed groups");

    let mut assignment = WeekAssignment { groups };
    if let Some(violation) = partition_violations(roster, week, &assignment)
        .into_iter()
        .next()
    {
        return Err(violation.into());
    }

    for group in &mut assignment.groups {
        select_leader(ledger, group, rng)?;
    }

    Ok(assignment)
}

/// Round-robin leftover members onto the already-formed groups.
fn distribute_leftovers(groups: &mut [Group], leftovers: Vec<Member>) {
    let slots = (0..groups.len()).cycle();
    for (slot, member) in slots.zip(leftovers) {
        groups[slot].push(member);
    }
}
