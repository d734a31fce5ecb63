#![forbid(unsafe_code)]
//! tablemates-core library.
//!
//! Splits a fixed roster into small dinner groups week after week so that
//! repeated pairings stay rare and the leader role rotates evenly.
//!
//! # Conventions
//!
//! - **Errors**: Library operations return [`error::ScheduleError`]; the
//!   campaign runner and config loader use `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Randomness**: Every random draw goes through a caller-supplied
//!   [`rand::Rng`], so a fixed seed reproduces a schedule exactly.

pub mod builder;
pub mod campaign;
pub mod config;
pub mod error;
pub mod generator;
pub mod history;
pub mod leader;
pub mod ledger;
pub mod oracle;
pub mod schedule;
pub mod week;

pub use config::SchedulerConfig;
pub use error::{InvariantViolation, ScheduleError};
pub use generator::ScheduleGenerator;
pub use history::{HistorySeed, PairCount};
pub use ledger::{LedgerSnapshot, PairingLedger};
pub use schedule::{Group, Member, Schedule, WeekAssignment};
