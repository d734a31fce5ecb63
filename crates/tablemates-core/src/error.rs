use std::fmt;

use crate::schedule::Member;

/// Logic faults that a correct scheduler never produces.
///
/// These abort the whole run instead of letting a corrupted schedule escape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// A member was about to be paired with itself.
    #[error("self-pairing attempted for {member}")]
    SelfPairing { member: Member },

    /// A member was placed twice in the same week.
    #[error("{member} appears more than once in week {week}")]
    DuplicateMember { week: usize, member: Member },

    /// A roster member was left out of a week.
    #[error("{member} is missing from week {week}")]
    MissingMember { week: usize, member: Member },

    /// A group with no members reached leader selection.
    #[error("leader requested for an empty group")]
    EmptyGroup,

    /// `count(a, b)` and `count(b, a)` disagree.
    #[error("ledger asymmetry: {a}->{b} = {forward}, {b}->{a} = {backward}")]
    LedgerAsymmetry {
        a: Member,
        b: Member,
        forward: u32,
        backward: u32,
    },

    /// Adding to a pair count would exceed `u32::MAX`.
    #[error("pair count for {a}/{b} would overflow")]
    PairCountOverflow { a: Member, b: Member },

    /// Adding to a leadership count would exceed `u32::MAX`.
    #[error("leadership count for {member} would overflow")]
    LeadershipOverflow { member: Member },
}

/// Errors returned by scheduling operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("group size must be at least 1 (got {0})")]
    InvalidGroupSize(usize),

    #[error("week count must be at least 1 (got {0})")]
    InvalidWeekCount(usize),

    #[error("group size {group_size} exceeds roster size {roster_size}")]
    GroupLargerThanRoster {
        group_size: usize,
        roster_size: usize,
    },

    #[error("roster is empty")]
    EmptyRoster,

    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl ScheduleError {
    /// Machine-readable classification of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidGroupSize(_) => ErrorCode::InvalidGroupSize,
            Self::InvalidWeekCount(_) => ErrorCode::InvalidWeekCount,
            Self::GroupLargerThanRoster { .. } => ErrorCode::GroupLargerThanRoster,
            Self::EmptyRoster => ErrorCode::EmptyRoster,
            Self::Invariant(
                InvariantViolation::PairCountOverflow { .. }
                | InvariantViolation::LeadershipOverflow { .. },
            ) => ErrorCode::CountOverflow,
            Self::Invariant(_) => ErrorCode::InvariantViolated,
        }
    }

    /// True for faults that are detected before any week is scheduled.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        !matches!(self, Self::Invariant(_))
    }
}

/// Stable error codes for scripts and agents driving the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidGroupSize,
    InvalidWeekCount,
    GroupLargerThanRoster,
    EmptyRoster,
    CountOverflow,
    InvariantViolated,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidGroupSize => "E1001",
            Self::InvalidWeekCount => "E1002",
            Self::GroupLargerThanRoster => "E1003",
            Self::EmptyRoster => "E2001",
            Self::CountOverflow => "E2002",
            Self::InvariantViolated => "E9001",
        }
    }

    /// Optional remediation hint for terminal output.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidGroupSize => Some("Pass --group-size with a value of 1 or more."),
            Self::InvalidWeekCount => Some("Pass --weeks with a value of 1 or more."),
            Self::GroupLargerThanRoster => {
                Some("Lower --group-size or add members to the roster file.")
            }
            Self::EmptyRoster => Some("Add one member name per line to the roster file."),
            Self::CountOverflow => Some("Check the history file for implausibly large counts."),
            Self::InvariantViolated => Some("Report a bug with the seed and roster used."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::InvalidGroupSize,
            ErrorCode::InvalidWeekCount,
            ErrorCode::GroupLargerThanRoster,
            ErrorCode::EmptyRoster,
            ErrorCode::CountOverflow,
            ErrorCode::InvariantViolated,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn invariant_converts_into_schedule_error() {
        let err: ScheduleError = InvariantViolation::SelfPairing {
            member: Member::from("Ada"),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::InvariantViolated);
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("Ada"));
    }

    #[test]
    fn configuration_errors_are_flagged() {
        assert!(ScheduleError::EmptyRoster.is_configuration());
        assert!(ScheduleError::InvalidGroupSize(0).is_configuration());
        assert_eq!(ScheduleError::InvalidWeekCount(0).code().code(), "E1002");
    }

    #[test]
    fn overflow_has_its_own_input_code() {
        let err: ScheduleError = InvariantViolation::LeadershipOverflow {
            member: Member::from("Ada"),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::CountOverflow);
        assert_eq!(err.code().code(), "E2002");
        assert!(!err.is_configuration());
    }
}
