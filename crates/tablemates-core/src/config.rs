use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ScheduleError;

/// Default project config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "tablemates.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub schedule: SchedulerConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// Parameters of one scheduling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    #[serde(default = "default_weeks")]
    pub weeks: usize,
    /// RNG seed; `None` draws one from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            weeks: default_weeks(),
            seed: None,
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub const fn new(group_size: usize, weeks: usize) -> Self {
        Self {
            group_size,
            weeks,
            seed: None,
        }
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject configurations that cannot produce a well-formed schedule.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, checked in this order: empty roster,
    /// zero group size, zero weeks, group size larger than the roster.
    pub fn validate(&self, roster_size: usize) -> Result<(), ScheduleError> {
        if roster_size == 0 {
            return Err(ScheduleError::EmptyRoster);
        }
        if self.group_size == 0 {
            return Err(ScheduleError::InvalidGroupSize(self.group_size));
        }
        if self.weeks == 0 {
            return Err(ScheduleError::InvalidWeekCount(self.weeks));
        }
        if self.group_size > roster_size {
            return Err(ScheduleError::GroupLargerThanRoster {
                group_size: self.group_size,
                roster_size,
            });
        }
        Ok(())
    }
}

/// Where the CLI finds its input files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub roster: Option<PathBuf>,
    #[serde(default)]
    pub history: Option<PathBuf>,
}

/// Load a project config file. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_project_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse config TOML text.
///
/// # Errors
///
/// Returns the TOML deserialization error.
pub fn parse_project_config(content: &str) -> Result<ProjectConfig> {
    Ok(toml::from_str::<ProjectConfig>(content)?)
}

const fn default_group_size() -> usize {
    4
}

const fn default_weeks() -> usize {
    12
}
