use std::collections::{BTreeMap, BTreeSet};

use crate::error::InvariantViolation;
use crate::history::HistorySeed;
use crate::ledger::PairingLedger;
use crate::schedule::{Member, Schedule, WeekAssignment};

// ── Core result types ─────────────────────────────────────────────────────────

/// Outcome of one or more oracle checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResult {
    /// `true` iff no violations were found.
    pub passed: bool,
    /// Every violation found, in discovery order.
    pub violations: Vec<ScheduleViolation>,
}

impl OracleResult {
    #[must_use]
    fn pass() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
        }
    }

    #[must_use]
    fn from_violations(violations: Vec<ScheduleViolation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }

    /// Merge another result into this one (failures accumulate).
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        if !other.passed {
            self.passed = false;
            self.violations.extend(other.violations);
        }
        self
    }
}

// ── Violation diagnostics ─────────────────────────────────────────────────────

/// A property a generated schedule or ledger failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleViolation {
    /// A hard invariant also guarded by the scheduler itself.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// A week placed someone who is not on the roster.
    #[error("{member} in week {week} is not on the roster")]
    UnknownMember { week: usize, member: Member },

    /// A group is outside `[group_size, group_size + roster % group_size]`.
    #[error("week {week} group {group} has {size} members (allowed {min}..={max})")]
    GroupSize {
        week: usize,
        group: usize,
        size: usize,
        min: usize,
        max: usize,
    },

    /// A week has the wrong number of groups.
    #[error("week {week} has {actual} groups, expected {expected}")]
    GroupCount {
        week: usize,
        expected: usize,
        actual: usize,
    },

    /// The schedule has the wrong number of weeks.
    #[error("schedule has {actual} weeks, expected {expected}")]
    WeekCount { expected: usize, actual: usize },

    /// A ledger pair count disagrees with seed + schedule.
    #[error("pair {a}/{b}: ledger has {actual}, schedule implies {expected}")]
    PairCountMismatch {
        a: Member,
        b: Member,
        expected: u32,
        actual: u32,
    },

    /// A ledger leadership count disagrees with seed + schedule.
    #[error("leadership of {member}: ledger has {actual}, schedule implies {expected}")]
    LeadershipMismatch {
        member: Member,
        expected: u32,
        actual: u32,
    },
}

// ── Checks ────────────────────────────────────────────────────────────────────

/// Partition check for one week: every roster member exactly once.
///
/// Reports duplicates first (in placement order), then missing members (in
/// roster order). Members not on the roster are ignored here; see
/// [`check_schedule`].
#[must_use]
pub fn partition_violations(
    roster: &[Member],
    week: usize,
    assignment: &WeekAssignment,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut placed: BTreeSet<&Member> = BTreeSet::new();

    for member in assignment.members() {
        if !placed.insert(member) {
            violations.push(InvariantViolation::DuplicateMember {
                week,
                member: member.clone(),
            });
        }
    }

    let mut reported: BTreeSet<&Member> = BTreeSet::new();
    for member in roster {
        if !placed.contains(member) && reported.insert(member) {
            violations.push(InvariantViolation::MissingMember {
                week,
                member: member.clone(),
            });
        }
    }

    violations
}

/// Structural checks on a generated schedule.
///
/// Covers week count, partition, group count and group size bounds, and
/// no-duplicate-within-group (which also means exactly one leader per group).
#[must_use]
pub fn check_schedule(
    schedule: &Schedule,
    roster: &[Member],
    group_size: usize,
    weeks: usize,
) -> OracleResult {
    let mut violations: Vec<ScheduleViolation> = Vec::new();

    if schedule.len() != weeks {
        violations.push(ScheduleViolation::WeekCount {
            expected: weeks,
            actual: schedule.len(),
        });
    }

    let (expected_groups, min, max) = if group_size == 0 || roster.len() < group_size {
        (1, roster.len(), roster.len())
    } else {
        (
            roster.len() / group_size,
            group_size,
            group_size + roster.len() % group_size,
        )
    };
    let known: BTreeSet<&Member> = roster.iter().collect();

    for (idx, assignment) in schedule.weeks.iter().enumerate() {
        let week = idx + 1;

        violations.extend(
            partition_violations(roster, week, assignment)
                .into_iter()
                .map(ScheduleViolation::from),
        );

        for member in assignment.members() {
            if !known.contains(member) {
                violations.push(ScheduleViolation::UnknownMember {
                    week,
                    member: member.clone(),
                });
            }
        }

        if assignment.groups.len() != expected_groups {
            violations.push(ScheduleViolation::GroupCount {
                week,
                expected: expected_groups,
                actual: assignment.groups.len(),
            });
        }

        for (group_idx, group) in assignment.groups.iter().enumerate() {
            if group.len() < min || group.len() > max {
                violations.push(ScheduleViolation::GroupSize {
                    week,
                    group: group_idx + 1,
                    size: group.len(),
                    min,
                    max,
                });
            }
        }
    }

    OracleResult::from_violations(violations)
}

/// Ledger symmetry.
#[must_use]
pub fn check_ledger(ledger: &PairingLedger) -> OracleResult {
    match ledger.check_symmetry() {
        Ok(()) => OracleResult::pass(),
        Err(violation) => OracleResult::from_violations(vec![violation.into()]),
    }
}

/// The ledger must equal `seed` plus exactly what `schedule` implies.
#[must_use]
pub fn check_consistency(
    ledger: &PairingLedger,
    seed: &HistorySeed,
    schedule: &Schedule,
) -> OracleResult {
    let mut expected_pairs: BTreeMap<(Member, Member), u32> = BTreeMap::new();
    let mut expected_leaders: BTreeMap<Member, u32> = BTreeMap::new();
    let derived = HistorySeed::from_schedule(schedule);

    for pair in seed.pairs.iter().chain(&derived.pairs) {
        if pair.a == pair.b || pair.count == 0 {
            continue;
        }
        let key = if pair.a < pair.b {
            (pair.a.clone(), pair.b.clone())
        } else {
            (pair.b.clone(), pair.a.clone())
        };
        let cell = expected_pairs.entry(key).or_insert(0);
        *cell = cell.saturating_add(pair.count);
    }
    for (member, count) in seed.leadership.iter().chain(&derived.leadership) {
        let cell = expected_leaders.entry(member.clone()).or_insert(0);
        *cell = cell.saturating_add(*count);
    }

    let mut violations: Vec<ScheduleViolation> = Vec::new();

    for ((a, b), &expected) in &expected_pairs {
        let actual = ledger.pairing_count(a, b);
        if actual != expected {
            violations.push(ScheduleViolation::PairCountMismatch {
                a: a.clone(),
                b: b.clone(),
                expected,
                actual,
            });
        }
    }
    for (a, b, actual) in ledger.pairs() {
        if !expected_pairs.contains_key(&(a.clone(), b.clone())) {
            violations.push(ScheduleViolation::PairCountMismatch {
                a: a.clone(),
                b: b.clone(),
                expected: 0,
                actual,
            });
        }
    }
    for (member, &expected) in &expected_leaders {
        let actual = ledger.leadership_count(member);
        if actual != expected {
            violations.push(ScheduleViolation::LeadershipMismatch {
                member: member.clone(),
                expected,
                actual,
            });
        }
    }
    for (member, &actual) in &ledger.snapshot().leadership {
        if actual > 0 && !expected_leaders.contains_key(member) {
            violations.push(ScheduleViolation::LeadershipMismatch {
                member: member.clone(),
                expected: 0,
                actual,
            });
        }
    }

    OracleResult::from_violations(violations)
}

/// Run every check in one shot.
#[must_use]
pub fn check_all(
    schedule: &Schedule,
    ledger: &PairingLedger,
    seed: &HistorySeed,
    roster: &[Member],
    group_size: usize,
    weeks: usize,
) -> OracleResult {
    OracleResult::pass()
        .merge(check_schedule(schedule, roster, group_size, weeks))
        .merge(check_ledger(ledger))
        .merge(check_consistency(ledger, seed, schedule))
}
