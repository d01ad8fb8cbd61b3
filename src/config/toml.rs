//! TOML settings file parsing
//!
//! ```toml
//! workers = 8
//! timeout_secs = 120
//! host_list = ["10.0.1.10:9999", "10.0.1.11:9999"]
//! output = "json"
//! ```
//!
//! Every key is optional.

use super::*;
use crate::config::cli::WorkloadCli;
use crate::config::cli_convert::{parse_duration, parse_host_list};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML settings file
pub fn parse_toml_file(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML settings from string
pub fn parse_toml_string(contents: &str) -> Result<Settings> {
    let settings: Settings = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(settings)
}

/// Merge CLI arguments with settings (CLI takes precedence)
pub fn merge_cli_with_settings(cli: &WorkloadCli, mut settings: Settings) -> Result<Settings> {
    if let Some(workers) = cli.workers {
        settings.workers = workers;
    }

    if let Some(ref timeout_str) = cli.timeout {
        let timeout = parse_duration(timeout_str).context("Invalid timeout")?;
        // Sub-second timeouts round up so they never collapse to zero
        settings.timeout_secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
    }

    if let Some(ref hosts) = cli.host_list {
        settings.host_list = parse_host_list(hosts);
    }

    if let Some(output) = cli.output {
        settings.output = output;
    }

    Ok(settings)
}

/// Load the settings file named on the command line (if any) and apply CLI overrides
pub fn load_settings(cli: &WorkloadCli) -> Result<Settings> {
    let base = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Settings::default(),
    };
    merge_cli_with_settings(cli, base)
}
