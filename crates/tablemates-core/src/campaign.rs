//! Campaign runner for seeded scheduling runs.
//!
//! Generates one independent schedule per seed over a synthetic roster,
//! checks each against the oracle and identifies the first failing seed for
//! replay. Every seed gets a fresh ledger.

use std::ops::Range;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::generator::ScheduleGenerator;
use crate::history::HistorySeed;
use crate::ledger::PairingLedger;
use crate::oracle::{self, OracleResult, ScheduleViolation};
use crate::schedule::{Member, Schedule};

/// Campaign-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Range of seeds to execute, e.g., `0..100`.
    pub seed_range: Range<u64>,
    /// Size of the synthetic roster.
    pub member_count: usize,
    pub group_size: usize,
    pub weeks: usize,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            seed_range: 0..100,
            member_count: 18,
            group_size: 4,
            weeks: 12,
        }
    }
}

impl CampaignConfig {
    /// Validate configuration before running.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.seed_range.is_empty() {
            bail!("seed_range must not be empty");
        }
        if self.member_count == 0 {
            bail!("member_count must be > 0");
        }
        if self.group_size == 0 {
            bail!("group_size must be > 0");
        }
        if self.group_size > self.member_count {
            bail!(
                "group_size ({}) must not exceed member_count ({})",
                self.group_size,
                self.member_count
            );
        }
        if self.weeks == 0 {
            bail!("weeks must be > 0");
        }
        Ok(())
    }
}

/// Failure details for a single seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFailure {
    pub seed: u64,
    pub violations: Vec<String>,
}

/// Aggregate report produced by a campaign run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub seeds_run: usize,
    pub seeds_passed: usize,
    /// First seed that failed (for prioritized replay).
    pub first_failure: Option<u64>,
    pub failures: Vec<SeedFailure>,
    /// Largest `max - min` leadership count seen across all seeds.
    pub max_leadership_spread: u32,
}

impl CampaignReport {
    /// True if every seed passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Everything produced by replaying a single seed.
#[derive(Debug, Clone)]
pub struct SeedTrace {
    pub seed: u64,
    /// Roster in the order left by the final week's shuffle.
    pub roster: Vec<Member>,
    pub schedule: Schedule,
    pub ledger: PairingLedger,
    pub oracle: OracleResult,
}

impl SeedTrace {
    /// `max - min` leadership count across the roster.
    #[must_use]
    pub fn leadership_spread(&self) -> u32 {
        leadership_spread(&self.ledger, &self.roster)
    }
}

/// Roster `m01`, `m02`, ... of the requested size.
#[must_use]
pub fn synthetic_roster(member_count: usize) -> Vec<Member> {
    (1..=member_count)
        .map(|i| Member::new(format!("m{i:02}")))
        .collect()
}

/// Run a full campaign across all seeds in the config.
///
/// # Errors
///
/// Returns an error if config validation fails.
pub fn run_campaign(config: &CampaignConfig) -> Result<CampaignReport> {
    config.validate()?;

    let mut seeds_run = 0_usize;
    let mut seeds_passed = 0_usize;
    let mut first_failure: Option<u64> = None;
    let mut failures = Vec::new();
    let mut max_leadership_spread = 0_u32;

    for seed in config.seed_range.clone() {
        seeds_run += 1;

        match replay_seed(seed, config) {
            Ok(trace) if trace.oracle.passed => {
                seeds_passed += 1;
                max_leadership_spread = max_leadership_spread.max(trace.leadership_spread());
            }
            Ok(trace) => {
                warn!(seed, violations = trace.oracle.violations.len(), "seed failed");
                first_failure.get_or_insert(seed);
                failures.push(SeedFailure {
                    seed,
                    violations: trace
                        .oracle
                        .violations
                        .iter()
                        .map(ScheduleViolation::to_string)
                        .collect(),
                });
            }
            Err(err) => {
                warn!(seed, error = %err, "seed aborted");
                first_failure.get_or_insert(seed);
                failures.push(SeedFailure {
                    seed,
                    violations: vec![format!("{err:#}")],
                });
            }
        }
    }

    info!(seeds_run, seeds_passed, "campaign complete");

    Ok(CampaignReport {
        seeds_run,
        seeds_passed,
        first_failure,
        failures,
        max_leadership_spread,
    })
}

/// Replay one seed and return the full trace with oracle results.
///
/// # Errors
///
/// Returns an error if the config is invalid or generation aborts on an
/// invariant violation.
pub fn replay_seed(seed: u64, config: &CampaignConfig) -> Result<SeedTrace> {
    config.validate()?;

    let mut roster = synthetic_roster(config.member_count);
    let mut generator = ScheduleGenerator::from_seed(seed);
    let schedule = generator.generate(&mut roster, config.group_size, config.weeks)?;
    let ledger = generator.into_ledger();

    let oracle = oracle::check_all(
        &schedule,
        &ledger,
        &HistorySeed::default(),
        &roster,
        config.group_size,
        config.weeks,
    );
    debug!(seed, passed = oracle.passed, "replayed seed");

    Ok(SeedTrace {
        seed,
        roster,
        schedule,
        ledger,
        oracle,
    })
}

fn leadership_spread(ledger: &PairingLedger, roster: &[Member]) -> u32 {
    let counts = roster.iter().map(|m| ledger.leadership_count(m));
    let max = counts.clone().max().unwrap_or(0);
    let min = counts.min().unwrap_or(0);
    max - min
}
