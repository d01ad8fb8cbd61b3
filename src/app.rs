//! Entry points shared by the binaries
//!
//! `squares` and `primes` differ only in the [`Workload`] they pass to
//! [`run_workload`]. `rangefold-node` calls [`run_node`].

use crate::config::cli::{NodeCli, WorkloadCli};
use crate::config::toml::load_settings;
use crate::config::validator::validate_settings;
use crate::config::{Mode, RunConfig, Settings};
use crate::coordinator::{run_single, Coordinator, FinalResult, ThreadPool};
use crate::distributed::{NodeService, RemotePool};
use crate::error::RunError;
use crate::output;
use crate::worker::Workload;
use crate::Result;
use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit status for configuration errors, same as clap's usage errors
const EXIT_USAGE: u8 = 2;

/// Run a workload binary: parse arguments, compute, print
pub fn run_workload(workload: Workload) -> ExitCode {
    let cli = WorkloadCli::parse_for(workload);
    setup_logging(cli.debug);

    match run(workload, &cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(report_failure(&mut io::stderr(), &e, Some(workload.name()))),
    }
}

fn run(workload: Workload, cli: &WorkloadCli) -> Result<()> {
    let settings = load_settings(cli).map_err(|e| RunError::invalid(format!("{:#}", e)))?;
    validate_settings(&settings)?;

    let config = RunConfig::new(cli.mode, workload, cli.amount, settings.workers, settings.timeout())?;

    let result = execute(&config, &settings)?;
    output::print_result(&result, settings.output)
}

/// Execute a validated run
///
/// Single mode computes in place. Distributed mode uses local threads unless
/// a host list is configured.
pub fn execute(config: &RunConfig, settings: &Settings) -> Result<FinalResult> {
    let result = match config.mode {
        Mode::Single => run_single(config.workload, config.total_work)?,
        Mode::Distributed if settings.host_list.is_empty() => {
            info!(workers = config.worker_count, "distributing over local threads");
            Coordinator::new(ThreadPool::new()).run(config)?
        }
        Mode::Distributed => {
            info!(
                workers = config.worker_count,
                nodes = settings.host_list.len(),
                "distributing over remote nodes"
            );
            let pool = RemotePool::new(settings.host_list.clone())?.with_timeout(config.timeout);
            Coordinator::new(pool).run(config)?
        }
    };

    Ok(result)
}

/// Map a failure to the process exit status
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RunError>() {
        Some(RunError::InvalidConfig(_)) => EXIT_USAGE,
        _ => 1,
    }
}

/// Write a failure once to `out` and pick the exit status
///
/// A usage hint follows configuration errors when `program` is given.
fn report_failure(out: &mut impl Write, err: &anyhow::Error, program: Option<&str>) -> u8 {
    let code = exit_code_for(err);
    let _ = writeln!(out, "Error: {:#}", err);
    if let (EXIT_USAGE, Some(program)) = (code, program) {
        let _ = writeln!(out, "Usage: {} <single|distributed> <amount> [options]", program);
    }
    code
}

/// Run the node service until it fails
pub fn run_node() -> ExitCode {
    let cli = NodeCli::parse();
    setup_logging(cli.debug);

    match serve_node(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(report_failure(&mut io::stderr(), &e, None)),
    }
}

fn serve_node(cli: &NodeCli) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let service = NodeService::new(cli.bind.clone(), cli.listen_port)?;
        info!(node = service.node_id(), port = cli.listen_port, "starting node service");
        service.run().await
    })
}

/// Diagnostics go to stderr; stdout carries only results
///
/// `RUST_LOG` wins when set.
fn setup_logging(debug: bool) {
    let default = if debug { "rangefold=debug,warn" } else { "rangefold=info,warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Already initialised when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
