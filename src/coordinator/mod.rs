//! Coordinator module
//!
//! Orchestrates workers and aggregates results.
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> Dispatching -> AwaitingResults -> Reducing -> Done
//!              \               \               \
//!               `---------------`---------------`--> Failed
//! ```
//!
//! There is no retry: the first worker failure, a silent worker past the
//! timeout, or a reduction error moves the run to `Failed` and no partial
//! result is reported.
//!
//! The clock starts just before dispatch and stops after reduction, so the
//! reported time covers the whole distributed phase.

pub mod local;
pub mod pool;

use crate::config::{Mode, RunConfig};
use crate::error::RunError;
use crate::partition::{partition, WorkRange};
use crate::reducer::{ReducedValue, Reducer};
use crate::worker::Workload;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use pool::{WorkerPool, WorkerReport};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use local::ThreadPool;

/// Coordinator run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Dispatching,
    AwaitingResults,
    Reducing,
    Done,
    Failed,
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalResult {
    pub mode: Mode,
    pub workload: Workload,
    pub total_work: u64,
    pub worker_count: usize,
    pub value: ReducedValue,
    pub elapsed: Duration,
}

/// Drives one run over an injected worker pool
pub struct Coordinator<P: WorkerPool> {
    pool: P,
    phase: RunPhase,
}

impl<P: WorkerPool> Coordinator<P> {
    pub fn new(pool: P) -> Self {
        Self {
            pool,
            phase: RunPhase::Idle,
        }
    }

    /// Current phase (terminal after `run` returns)
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Partition, dispatch, wait for every worker, reduce
    pub fn run(&mut self, config: &RunConfig) -> Result<FinalResult, RunError> {
        self.phase = RunPhase::Idle;

        match self.execute(config) {
            Ok(result) => {
                self.transition(RunPhase::Done);
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "run failed");
                self.transition(RunPhase::Failed);
                Err(e)
            }
        }
    }

    fn execute(&mut self, config: &RunConfig) -> Result<FinalResult, RunError> {
        let assignments = partition(config.total_work, config.worker_count)?;

        info!(
            workload = %config.workload,
            total = config.total_work,
            workers = config.worker_count,
            transport = self.pool.name(),
            "starting distributed run"
        );

        let started = Instant::now();

        self.transition(RunPhase::Dispatching);
        let reports = self.pool.dispatch(config.workload, assignments);

        self.transition(RunPhase::AwaitingResults);
        let reducer = collect(&reports, config.workload, config.worker_count, config.timeout)?;

        self.transition(RunPhase::Reducing);
        let value = reducer.reduce()?;
        let elapsed = started.elapsed();

        Ok(FinalResult {
            mode: Mode::Distributed,
            workload: config.workload,
            total_work: config.total_work,
            worker_count: config.worker_count,
            value,
            elapsed,
        })
    }

    fn transition(&mut self, next: RunPhase) {
        debug!(from = ?self.phase, to = ?next, "coordinator phase");
        self.phase = next;
    }
}

/// Barrier: block until `expected` workers have reported or the deadline passes
///
/// A failure report ends the wait immediately. If every sender is dropped
/// while workers are still missing, the first missing worker is reported as
/// failed.
pub fn collect(
    reports: &Receiver<WorkerReport>,
    workload: Workload,
    expected: usize,
    timeout: Duration,
) -> Result<Reducer, RunError> {
    let deadline = Instant::now() + timeout;
    let mut reducer = Reducer::new(workload, expected);

    while !reducer.is_complete() {
        match reports.recv_deadline(deadline) {
            Ok(report) => {
                let partial = report.outcome.map_err(|e| match e {
                    RunError::WorkerFailure { .. } | RunError::WorkerTimeout { .. } => e,
                    other => RunError::worker(report.worker_id, other),
                })?;
                reducer.add_partial(report.worker_id, partial)?;
                debug!(
                    worker = report.worker_id,
                    received = reducer.num_received(),
                    expected,
                    "partial result collected"
                );
            }
            Err(RecvTimeoutError::Timeout) => {
                return Err(RunError::WorkerTimeout {
                    missing: reducer.missing(),
                    timeout,
                });
            }
            Err(RecvTimeoutError::Disconnected) => {
                let worker_id = reducer.missing().first().copied().unwrap_or_default();
                return Err(RunError::worker(worker_id, "exited without reporting"));
            }
        }
    }

    Ok(reducer)
}

/// Single-machine mode: one sequential computation over `[0, total_work)`
///
/// Bypasses partitioning and the worker pool entirely.
pub fn run_single(workload: Workload, total_work: u64) -> Result<FinalResult, RunError> {
    let range = WorkRange {
        start: 0,
        end: total_work,
    };

    let started = Instant::now();
    let value = ReducedValue::from(workload.compute(range)?);
    let elapsed = started.elapsed();

    debug!(workload = %workload, total = total_work, ?elapsed, "single-machine run complete");

    Ok(FinalResult {
        mode: Mode::Single,
        workload,
        total_work,
        worker_count: 1,
        value,
        elapsed,
    })
}
