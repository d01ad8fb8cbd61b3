//! Configuration module
//!
//! Handles CLI argument parsing, the optional TOML settings file, and
//! validation. Precedence is defaults < settings file < CLI flags.
//!
//! The outcome is a [`RunConfig`], built once at start and never mutated, and
//! the [`Settings`] that decide how workers are reached.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use crate::error::RunError;
use crate::worker::Workload;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One sequential computation over the whole range
    Single,
    /// Partition across workers and reduce at the coordinator
    Distributed,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => f.write_str("single"),
            Mode::Distributed => f.write_str("distributed"),
        }
    }
}

/// Report format on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Immutable description of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub mode: Mode,
    pub workload: Workload,
    /// Total numbers (squares) or total primes (primes)
    pub total_work: u64,
    pub worker_count: usize,
    /// Bounded wait for all partial results
    pub timeout: Duration,
}

impl RunConfig {
    /// Build and validate a run configuration
    ///
    /// `amount` is signed so that a negative value supplied by the user is
    /// reported as `InvalidConfig` instead of being unrepresentable.
    pub fn new(
        mode: Mode,
        workload: Workload,
        amount: i64,
        worker_count: usize,
        timeout: Duration,
    ) -> Result<Self, RunError> {
        let total_work = validator::validate_amount(amount)?;
        validator::validate_worker_count(worker_count)?;
        validator::validate_timeout(timeout)?;

        Ok(Self {
            mode,
            workload,
            total_work,
            worker_count,
            timeout,
        })
    }
}

/// File-backed defaults for how a run is executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Number of workers in distributed mode
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Seconds to wait for every worker before failing the run
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Remote node addresses (`host:port`); empty means local threads
    #[serde(default)]
    pub host_list: Vec<String>,
    #[serde(default)]
    pub output: OutputFormat,
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            timeout_secs: default_timeout_secs(),
            host_list: Vec::new(),
            output: OutputFormat::default(),
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_valid() {
        let config = RunConfig::new(
            Mode::Distributed,
            Workload::Squares,
            1000,
            4,
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(config.total_work, 1000);
        assert_eq!(config.worker_count, 4);
    }

    #[test]
    fn test_run_config_zero_amount_allowed() {
        let config =
            RunConfig::new(Mode::Single, Workload::Primes, 0, 1, Duration::from_secs(1)).unwrap();
        assert_eq!(config.total_work, 0);
    }

    #[test]
    fn test_run_config_negative_amount() {
        let err = RunConfig::new(
            Mode::Distributed,
            Workload::Squares,
            -1,
            2,
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::InvalidConfig(_)));
    }

    #[test]
    fn test_run_config_zero_workers() {
        let err = RunConfig::new(
            Mode::Distributed,
            Workload::Squares,
            10,
            0,
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::InvalidConfig(_)));
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(settings.workers >= 1);
        assert_eq!(settings.timeout(), Duration::from_secs(300));
        assert!(settings.host_list.is_empty());
        assert_eq!(settings.output, OutputFormat::Text);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Single.to_string(), "single");
        assert_eq!(Mode::Distributed.to_string(), "distributed");
    }
}
