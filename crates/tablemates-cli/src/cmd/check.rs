//! `tm check`: run the scheduler over many seeds and verify every invariant.
//!
//! Each seed gets its own synthetic roster `m01..mNN` and a fresh ledger.
//! Exits with status 1 if any seed fails so CI can gate on it.

use std::io::{self, Write};
use std::process;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tablemates_core::campaign::{CampaignConfig, CampaignReport, run_campaign};

use crate::output::{OutputMode, write_json};

/// Failures shown in text mode before truncating.
const SHOWN_FAILURES: usize = 5;

/// Arguments for `tm check`.
#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:\n    # 100 seeds with the defaults\n    tm check\n\n\
                        # Stress a small roster with awkward leftovers\n    \
                        tm check --seeds 500 --members 11 --group-size 4 --weeks 30\n\n\
                        # Machine-readable output\n    tm check --format json")]
pub struct CheckArgs {
    /// Number of seeds to run.
    #[arg(long, default_value = "100")]
    pub seeds: u64,

    /// Starting seed value.
    #[arg(long, default_value = "0")]
    pub seed_start: u64,

    /// Size of the synthetic roster.
    #[arg(long, default_value = "18")]
    pub members: usize,

    /// Target members per group.
    #[arg(long, default_value = "4")]
    pub group_size: usize,

    /// Weeks scheduled per seed.
    #[arg(long, default_value = "12")]
    pub weeks: usize,
}

impl CheckArgs {
    fn campaign_config(&self) -> CampaignConfig {
        CampaignConfig {
            seed_range: self.seed_start..self.seed_start.saturating_add(self.seeds),
            member_count: self.members,
            group_size: self.group_size,
            weeks: self.weeks,
        }
    }
}

/// JSON output for `tm check`.
#[derive(Debug, Serialize)]
struct CheckOutput<'a> {
    seeds_run: usize,
    seeds_passed: usize,
    seeds_failed: usize,
    first_failure: Option<u64>,
    max_leadership_spread: u32,
    all_passed: bool,
    failures: &'a [tablemates_core::campaign::SeedFailure],
}

impl<'a> From<&'a CampaignReport> for CheckOutput<'a> {
    fn from(report: &'a CampaignReport) -> Self {
        Self {
            seeds_run: report.seeds_run,
            seeds_passed: report.seeds_passed,
            seeds_failed: report.failures.len(),
            first_failure: report.first_failure,
            max_leadership_spread: report.max_leadership_spread,
            all_passed: report.all_passed(),
            failures: &report.failures,
        }
    }
}

/// Execute `tm check`.
///
/// # Errors
///
/// Returns an error if the campaign configuration is invalid or output
/// cannot be written.
pub fn run_check(args: &CheckArgs, output: OutputMode) -> Result<()> {
    let report = run_campaign(&args.campaign_config())?;
    let out = CheckOutput::from(&report);

    let stdout = io::stdout();
    let mut w = stdout.lock();
    match output {
        OutputMode::Json => write_json(&mut w, &out)?,
        OutputMode::Text => write_text(&mut w, args, &out)?,
    }
    w.flush()?;
    drop(w);

    // Exit code 1 on any failure for CI integration
    if !out.all_passed {
        process::exit(1);
    }

    Ok(())
}

fn write_text(w: &mut dyn Write, args: &CheckArgs, out: &CheckOutput<'_>) -> io::Result<()> {
    writeln!(
        w,
        "campaign seeds_run={} members={} group_size={} weeks={}",
        out.seeds_run, args.members, args.group_size, args.weeks
    )?;
    writeln!(
        w,
        "results passed={} failed={} max_leadership_spread={} all_passed={}",
        out.seeds_passed, out.seeds_failed, out.max_leadership_spread, out.all_passed
    )?;
    if out.all_passed {
        return Ok(());
    }

    for failure in out.failures.iter().take(SHOWN_FAILURES) {
        writeln!(
            w,
            "failure seed={} violations={}",
            failure.seed,
            failure.violations.len()
        )?;
        for violation in &failure.violations {
            writeln!(w, "  {violation}")?;
        }
    }
    if out.failures.len() > SHOWN_FAILURES {
        writeln!(
            w,
            "failures_truncated count={}",
            out.failures.len() - SHOWN_FAILURES
        )?;
    }
    if let Some(seed) = out.first_failure {
        writeln!(
            w,
            "hint rerun=\"tm check --seed-start {seed} --seeds 1 --members {} --group-size {} --weeks {}\"",
            args.members, args.group_size, args.weeks
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablemates_core::campaign::SeedFailure;

    fn args() -> CheckArgs {
        CheckArgs {
            seeds: 10,
            seed_start: 5,
            members: 9,
            group_size: 4,
            weeks: 3,
        }
    }

    #[test]
    fn seed_range_starts_at_seed_start() {
        let config = args().campaign_config();
        assert_eq!(config.seed_range, 5..15);
        assert_eq!(config.member_count, 9);
    }

    #[test]
    fn seed_range_saturates_instead_of_overflowing() {
        let mut a = args();
        a.seed_start = u64::MAX - 1;
        assert_eq!(a.campaign_config().seed_range, u64::MAX - 1..u64::MAX);
    }

    #[test]
    fn passing_report_prints_two_lines() {
        let report = CampaignReport {
            seeds_run: 10,
            seeds_passed: 10,
            first_failure: None,
            failures: Vec::new(),
            max_leadership_spread: 1,
        };
        let mut buf = Vec::new();
        write_text(&mut buf, &args(), &CheckOutput::from(&report)).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("all_passed=true"));
    }

    #[test]
    fn failing_report_lists_violations_and_rerun_hint() {
        let report = CampaignReport {
            seeds_run: 10,
            seeds_passed: 9,
            first_failure: Some(7),
            failures: vec![SeedFailure {
                seed: 7,
                violations: vec!["week 2: m03 placed twice".to_string()],
            }],
            max_leadership_spread: 0,
        };
        let mut buf = Vec::new();
        write_text(&mut buf, &args(), &CheckOutput::from(&report)).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("failure seed=7 violations=1"));
        assert!(text.contains("  week 2: m03 placed twice"));
        assert!(text.contains("--seed-start 7 --seeds 1"));
    }
}
