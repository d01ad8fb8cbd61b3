//! CLI argument parsing using clap

use crate::config::{Mode, OutputFormat};
use crate::worker::Workload;
use clap::{CommandFactory, FromArgMatches, Parser};
use std::path::PathBuf;

/// Command line of the `squares` and `primes` binaries
///
/// ```text
/// <program> <mode> <amount> [options]
/// ```
#[derive(Parser, Debug)]
#[command(version, long_about = None)]
pub struct WorkloadCli {
    /// Execution mode: single or distributed
    #[arg(value_enum)]
    pub mode: Mode,

    /// Total numbers (squares) or total primes to find (primes)
    #[arg(allow_negative_numbers = true)]
    pub amount: i64,

    /// Number of workers in distributed mode (default: number of CPUs)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Maximum wait for all workers (e.g., 30s, 5m)
    #[arg(short = 't', long)]
    pub timeout: Option<String>,

    /// Comma-separated list of node addresses (e.g., "10.0.1.10:9999,10.0.1.11:9999")
    ///
    /// Without it, distributed mode runs workers as local threads.
    #[arg(long)]
    pub host_list: Option<String>,

    /// Report format
    #[arg(short = 'o', long, value_enum)]
    pub output: Option<OutputFormat>,

    /// TOML settings file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,
}

impl WorkloadCli {
    /// Parse the process arguments under the workload's program name
    ///
    /// Prints usage and exits non-zero on a wrong argument count, unknown
    /// mode, or non-numeric amount.
    pub fn parse_for(workload: Workload) -> Self {
        let matches = Self::command_for(workload).get_matches();
        match Self::from_arg_matches(&matches) {
            Ok(cli) => cli,
            Err(e) => e.exit(),
        }
    }

    /// Fallible variant of [`parse_for`](Self::parse_for) over explicit arguments
    pub fn try_parse_for<I, T>(workload: Workload, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command_for(workload).try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    fn command_for(workload: Workload) -> clap::Command {
        let about = match workload {
            Workload::Squares => "Sum of squares over [0, amount), sequential or partitioned",
            Workload::Primes => "First `amount` prime numbers, sequential or partitioned",
        };
        Self::command()
            .name(workload.name())
            .bin_name(workload.name())
            .about(about)
    }
}

/// Command line of the `rangefold-node` worker service
#[derive(Parser, Debug)]
#[command(name = "rangefold-node")]
#[command(version, about = "Worker node serving range assignments from a coordinator", long_about = None)]
pub struct NodeCli {
    /// Port for the service to listen on
    #[arg(long, default_value = "9999")]
    pub listen_port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,
}
