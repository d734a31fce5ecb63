//! Shared output layer for text/JSON parity across CLI commands.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format`
//! 2. hidden `--json` flag
//! 3. `FORMAT` env var → `"text"` | `"json"`
//! 4. Default: [`OutputMode::Text`]

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};
use tablemates_core::ScheduleError;

/// The output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// One `key=value` line per record, easy to grep.
    Text,
    /// Machine-readable JSON document.
    Json,
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    match format_env.map(str::to_lowercase).as_deref() {
        Some("json") => OutputMode::Json,
        _ => OutputMode::Text,
    }
}

/// Resolve the output mode from CLI flags and the `FORMAT` env var.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. `E1003`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }
}

impl From<&ScheduleError> for CliError {
    fn from(err: &ScheduleError) -> Self {
        let code = err.code();
        Self {
            message: err.to_string(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.to_string()),
        }
    }
}

impl From<&anyhow::Error> for CliError {
    /// Scheduling errors keep their code and hint wherever they sit in the
    /// context chain.
    fn from(err: &anyhow::Error) -> Self {
        match err.chain().find_map(|e| e.downcast_ref::<ScheduleError>()) {
            Some(schedule_err) => {
                let mut cli = Self::from(schedule_err);
                cli.message = format!("{err:#}");
                cli
            }
            None => Self::new(format!("{err:#}")),
        }
    }
}

/// Serialize `value` as pretty JSON followed by a newline.
pub fn write_json<T: Serialize>(w: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            write_json(&mut out, &wrapper)?;
        }
        OutputMode::Text => {
            match error.error_code {
                Some(ref code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}
