//! `tm generate`: schedule dinner groups for a roster.
//!
//! Settings resolve with precedence flags > `TABLEMATES_*` env vars >
//! project config file > built-in defaults.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::{Deserialize, Serialize};
use tablemates_core::config::{PROJECT_CONFIG_FILE, ProjectConfig, load_project_config};
use tablemates_core::{
    HistorySeed, LedgerSnapshot, Member, Schedule, ScheduleGenerator, SchedulerConfig,
};
use tracing::{debug, info};

use crate::output::{OutputMode, write_json};
use crate::roster::load_roster;

/// Arguments for `tm generate`.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Roster file, one member per line.
    #[arg(long)]
    pub roster: Option<PathBuf>,

    /// Prior history: a `tm generate --format json` output or a bare history document.
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Target members per group.
    #[arg(long)]
    pub group_size: Option<usize>,

    /// Number of weeks to schedule.
    #[arg(long)]
    pub weeks: Option<usize>,

    /// RNG seed; drawn from entropy when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Config file (defaults to `tablemates.toml` in the working directory).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Fully resolved inputs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunSettings {
    roster: PathBuf,
    history: Option<PathBuf>,
    schedule: SchedulerConfig,
}

/// JSON output for `tm generate`.
#[derive(Debug, Serialize)]
struct GenerateOutput<'a> {
    seed: u64,
    group_size: usize,
    weeks: usize,
    schedule: &'a Schedule,
    ledger: LedgerSnapshot,
}

/// Accepted shapes of a `--history` file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoryDocument {
    /// Output of an earlier `tm generate --format json`.
    Previous {
        schedule: Schedule,
        #[serde(default)]
        ledger: Option<LedgerSnapshot>,
    },
    Seed(HistorySeed),
}

impl HistoryDocument {
    fn into_seed(self) -> HistorySeed {
        match self {
            // The ledger already folds in whatever history the earlier run
            // was seeded with; the bare schedule only covers its own weeks.
            Self::Previous {
                ledger: Some(ledger),
                ..
            } => ledger.into(),
            Self::Previous {
                schedule,
                ledger: None,
            } => HistorySeed::from_schedule(&schedule),
            Self::Seed(seed) => seed,
        }
    }
}

/// Execute `tm generate`.
///
/// # Errors
///
/// Returns an error if settings cannot be resolved, an input file cannot be
/// read, or scheduling fails.
pub fn run_generate(args: &GenerateArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let (config_path, explicit) = match args.config {
        Some(ref path) => (project_root.join(path), true),
        None => (project_root.join(PROJECT_CONFIG_FILE), false),
    };
    if explicit && !config_path.exists() {
        bail!("config file {} not found", config_path.display());
    }
    let file = load_project_config(&config_path)?;
    let config_dir = config_path.parent().unwrap_or(project_root);

    let settings = resolve_settings(args, file, config_dir, project_root, &|key: &str| {
        std::env::var(key).ok()
    })?;
    debug!(?settings, "resolved settings");

    let mut roster = load_roster(&settings.roster)?;
    let history = match settings.history {
        Some(ref path) => load_history(path)?,
        None => HistorySeed::default(),
    };

    let seed = settings.schedule.seed.unwrap_or_else(|| {
        let drawn = rand::random();
        info!(seed = drawn, "no seed given, drew one from entropy");
        drawn
    });

    let mut generator = ScheduleGenerator::from_seed(seed)
        .with_history(&history)
        .context("history file is not usable")?;
    let schedule = generator.generate_with(&mut roster, &settings.schedule)?;

    let out = GenerateOutput {
        seed,
        group_size: settings.schedule.group_size,
        weeks: settings.schedule.weeks,
        schedule: &schedule,
        ledger: generator.ledger().snapshot(),
    };

    let stdout = io::stdout();
    let mut w = stdout.lock();
    match output {
        OutputMode::Json => write_json(&mut w, &out)?,
        OutputMode::Text => write_text(&mut w, &schedule)?,
    }
    Ok(())
}

/// One `week=N group=M leader=X members=...` line per group.
fn write_text(w: &mut dyn Write, schedule: &Schedule) -> io::Result<()> {
    for (week_idx, week) in schedule.weeks.iter().enumerate() {
        for (group_idx, group) in week.groups.iter().enumerate() {
            let members: Vec<&str> = group.members().iter().map(Member::as_str).collect();
            writeln!(
                w,
                "week={} group={} leader={} members={}",
                week_idx + 1,
                group_idx + 1,
                group.leader().map_or("", Member::as_str),
                members.join(",")
            )?;
        }
    }
    Ok(())
}

/// Merge flags, environment and the project file into [`RunSettings`].
///
/// Paths from the project file are relative to the file's directory; flag
/// and env paths are relative to `project_root`.
fn resolve_settings(
    args: &GenerateArgs,
    file: ProjectConfig,
    config_dir: &Path,
    project_root: &Path,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<RunSettings> {
    let roster = args
        .roster
        .clone()
        .or_else(|| env("TABLEMATES_ROSTER").map(PathBuf::from))
        .map(|p| project_root.join(p))
        .or_else(|| file.input.roster.map(|p| config_dir.join(p)));
    let Some(roster) = roster else {
        bail!(
            "no roster given; pass --roster, set TABLEMATES_ROSTER or add \
             `roster` under [input] in {PROJECT_CONFIG_FILE}"
        );
    };

    let history = args
        .history
        .clone()
        .or_else(|| env("TABLEMATES_HISTORY").map(PathBuf::from))
        .map(|p| project_root.join(p))
        .or_else(|| file.input.history.map(|p| config_dir.join(p)));

    let mut schedule = file.schedule;
    if let Some(group_size) = pick(args.group_size, env, "TABLEMATES_GROUP_SIZE")? {
        schedule.group_size = group_size;
    }
    if let Some(weeks) = pick(args.weeks, env, "TABLEMATES_WEEKS")? {
        schedule.weeks = weeks;
    }
    if let Some(seed) = pick(args.seed, env, "TABLEMATES_SEED")? {
        schedule.seed = Some(seed);
    }

    Ok(RunSettings {
        roster,
        history,
        schedule,
    })
}

/// The flag value if given, else the parsed env var.
fn pick<T>(flag: Option<T>, env: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if flag.is_some() {
        return Ok(flag);
    }
    env(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}"))
        })
        .transpose()
}

/// Read a `--history` file in either accepted shape.
fn load_history(path: &Path) -> Result<HistorySeed> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history {}", path.display()))?;
    parse_history(&content).with_context(|| format!("Failed to parse history {}", path.display()))
}

fn parse_history(content: &str) -> Result<HistorySeed> {
    let document: HistoryDocument = serde_json::from_str(content)?;
    if matches!(document, HistoryDocument::Seed(ref seed) if seed.is_empty()) {
        bail!("history document has no `pairs` or `leadership` entries");
    }
    Ok(document.into_seed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tablemates_core::PairCount;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn file_with_roster(roster: &str) -> ProjectConfig {
        let mut file = ProjectConfig::default();
        file.input.roster = Some(PathBuf::from(roster));
        file
    }

    // ── resolve_settings ────────────────────────────────────────────────────

    #[test]
    fn defaults_apply_when_only_roster_is_known() {
        let args = GenerateArgs {
            roster: Some(PathBuf::from("roster.txt")),
            ..GenerateArgs::default()
        };
        let settings = resolve_settings(
            &args,
            ProjectConfig::default(),
            Path::new("/cfg"),
            Path::new("/work"),
            &no_env,
        )
        .expect("resolves");
        assert_eq!(settings.roster, PathBuf::from("/work/roster.txt"));
        assert_eq!(settings.history, None);
        assert_eq!(settings.schedule, SchedulerConfig::default());
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let env: HashMap<&str, &str> = [
            ("TABLEMATES_ROSTER", "env-roster.txt"),
            ("TABLEMATES_GROUP_SIZE", "3"),
            ("TABLEMATES_WEEKS", "8"),
        ]
        .into_iter()
        .collect();
        let lookup = |key: &str| env.get(key).map(|v| (*v).to_string());

        let mut file = file_with_roster("file-roster.txt");
        file.schedule.group_size = 6;
        file.schedule.weeks = 20;
        file.schedule.seed = Some(7);

        let args = GenerateArgs {
            weeks: Some(2),
            ..GenerateArgs::default()
        };
        let settings = resolve_settings(&args, file, Path::new("/cfg"), Path::new("/work"), &lookup)
            .expect("resolves");

        assert_eq!(settings.roster, PathBuf::from("/work/env-roster.txt"));
        assert_eq!(settings.schedule.group_size, 3);
        assert_eq!(settings.schedule.weeks, 2);
        assert_eq!(settings.schedule.seed, Some(7));
    }

    #[test]
    fn file_paths_are_relative_to_config_dir() {
        let mut file = file_with_roster("members.txt");
        file.input.history = Some(PathBuf::from("last.json"));
        let settings = resolve_settings(
            &GenerateArgs::default(),
            file,
            Path::new("/cfg"),
            Path::new("/work"),
            &no_env,
        )
        .expect("resolves");
        assert_eq!(settings.roster, PathBuf::from("/cfg/members.txt"));
        assert_eq!(settings.history, Some(PathBuf::from("/cfg/last.json")));
    }

    #[test]
    fn missing_roster_is_an_error() {
        let err = resolve_settings(
            &GenerateArgs::default(),
            ProjectConfig::default(),
            Path::new("/cfg"),
            Path::new("/work"),
            &no_env,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no roster given"));
    }

    #[test]
    fn malformed_env_number_names_the_variable() {
        let lookup = |key: &str| (key == "TABLEMATES_SEED").then(|| "soon".to_string());
        let err = resolve_settings(
            &GenerateArgs::default(),
            file_with_roster("r.txt"),
            Path::new("/cfg"),
            Path::new("/work"),
            &lookup,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("TABLEMATES_SEED"));
    }

    // ── history documents ───────────────────────────────────────────────────

    #[test]
    fn bare_seed_document_parses() {
        let doc: HistoryDocument = serde_json::from_str(
            r#"{"pairs":[{"a":"A","b":"B","count":2}],"leadership":{"A":1}}"#,
        )
        .expect("parse");
        let seed = doc.into_seed();
        assert_eq!(
            seed.pairs,
            vec![PairCount {
                a: Member::from("A"),
                b: Member::from("B"),
                count: 2
            }]
        );
        assert_eq!(seed.leadership.get("A"), Some(&1));
    }

    #[test]
    fn previous_output_prefers_its_ledger() {
        let doc: HistoryDocument = serde_json::from_str(
            r#"{
                "seed": 1, "group_size": 2, "weeks": 1,
                "schedule": [[["A","B"]]],
                "ledger": {"pairs":[{"a":"A","b":"B","count":5}],"leadership":{"A":3}}
            }"#,
        )
        .expect("parse");
        let seed = doc.into_seed();
        assert_eq!(seed.pairs[0].count, 5);
        assert_eq!(seed.leadership.get("A"), Some(&3));
    }

    #[test]
    fn previous_schedule_without_ledger_is_derived() {
        let doc: HistoryDocument =
            serde_json::from_str(r#"{"schedule": [[["A","B"],["C","D"]]]}"#).expect("parse");
        let seed = doc.into_seed();
        assert_eq!(seed.pairs.len(), 2);
        assert_eq!(seed.leadership.get("A"), Some(&1));
        assert_eq!(seed.leadership.get("C"), Some(&1));
    }

    #[test]
    fn misspelled_history_keys_are_rejected() {
        let err = parse_history(r#"{"pair":[{"a":"A","b":"B","count":1}],"leadershp":{"A":4}}"#)
            .unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn empty_history_object_is_rejected() {
        let err = parse_history("{}").unwrap_err();
        assert!(err.to_string().contains("no `pairs` or `leadership`"));
    }

    #[test]
    fn history_with_only_leadership_is_accepted() {
        let seed = parse_history(r#"{"leadership":{"A":4}}"#).expect("parse");
        assert!(seed.pairs.is_empty());
        assert_eq!(seed.leadership.get("A"), Some(&4));
    }

    // ── text output ─────────────────────────────────────────────────────────

    #[test]
    fn text_lines_list_leader_then_members() {
        let schedule: Schedule =
            serde_json::from_str(r#"[[["A","B"],["C","D","E"]],[["E","A"],["B","C","D"]]]"#)
                .expect("parse");
        let mut buf = Vec::new();
        write_text(&mut buf, &schedule).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            text,
            "week=1 group=1 leader=A members=A,B\n\
             week=1 group=2 leader=C members=C,D,E\n\
             week=2 group=1 leader=E members=E,A\n\
             week=2 group=2 leader=B members=B,C,D\n"
        );
    }
}
