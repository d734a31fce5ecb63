//! Multi-week schedule generation.
//!
//! A [`ScheduleGenerator`] owns the ledger and the random source for one
//! run. Weeks are generated strictly in order because each week reads the
//! counts left behind by every earlier week; independent runs must each use
//! their own generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use crate::config::SchedulerConfig;
use crate::error::ScheduleError;
use crate::history::HistorySeed;
use crate::ledger::PairingLedger;
use crate::schedule::{Member, Schedule};
use crate::week::schedule_week;

/// Drives [`schedule_week`] across a run.
#[derive(Debug, Clone)]
pub struct ScheduleGenerator<R = StdRng> {
    ledger: PairingLedger,
    rng: R,
}

impl ScheduleGenerator<StdRng> {
    /// Generator with an empty ledger and a seeded [`StdRng`].
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::new(PairingLedger::new(), StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ScheduleGenerator<R> {
    #[must_use]
    pub const fn new(ledger: PairingLedger, rng: R) -> Self {
        Self { ledger, rng }
    }

    /// Seed the ledger with prior history before any week is generated.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Invariant`] if the history pairs a member with
    /// itself.
    pub fn with_history(mut self, history: &HistorySeed) -> Result<Self, ScheduleError> {
        self.ledger.seed(history)?;
        Ok(self)
    }

    #[must_use]
    pub const fn ledger(&self) -> &PairingLedger {
        &self.ledger
    }

    #[must_use]
    pub fn into_ledger(self) -> PairingLedger {
        self.ledger
    }

    /// Generate `weeks` consecutive week assignments.
    ///
    /// `roster` is shuffled in place every week and its order carries over
    /// into the next week; callers see the final order after return.
    /// Configuration is validated before anything is mutated, and no week is
    /// retried: the first error aborts the run.
    ///
    /// # Errors
    ///
    /// - Configuration errors from [`SchedulerConfig::validate`].
    /// - [`ScheduleError::Invariant`] if a week breaks the partition, which
    ///   only happens when the roster contains duplicate names.
    #[instrument(skip(self, roster), fields(roster = roster.len()))]
    pub fn generate(
        &mut self,
        roster: &mut [Member],
        group_size: usize,
        weeks: usize,
    ) -> Result<Schedule, ScheduleError> {
        SchedulerConfig::new(group_size, weeks).validate(roster.len())?;

        let mut schedule = Schedule {
            weeks: Vec::with_capacity(weeks),
        };
        for week in 1..=weeks {
            let assignment =
                schedule_week(&mut self.ledger, roster, group_size, week, &mut self.rng)?;
            debug!(
                week,
                leaders = ?assignment.leaders().map(Member::as_str).collect::<Vec<_>>(),
                "scheduled week"
            );
            schedule.weeks.push(assignment);
        }

        info!(weeks, group_size, "schedule generated");
        Ok(schedule)
    }

    /// [`Self::generate`] with parameters taken from `config`.
    ///
    /// `config.seed` is ignored here; it selects the RNG when the generator
    /// is built.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    pub fn generate_with(
        &mut self,
        roster: &mut [Member],
        config: &SchedulerConfig,
    ) -> Result<Schedule, ScheduleError> {
        self.generate(roster, config.group_size, config.weeks)
    }
}
