//! Worker pool abstraction
//!
//! A pool takes one [`WorkRange`] per worker and starts them all. Each worker
//! reports exactly once on the returned channel, whether it succeeded or
//! failed. Pools never aggregate: the coordinator owns the barrier.

use crate::error::RunError;
use crate::partition::WorkRange;
use crate::worker::{PartialResult, Workload};
use crossbeam::channel::Receiver;

/// Single report from a worker to the coordinator
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub outcome: Result<PartialResult, RunError>,
}

impl WorkerReport {
    pub fn success(worker_id: usize, partial: PartialResult) -> Self {
        Self {
            worker_id,
            outcome: Ok(partial),
        }
    }

    pub fn failure(worker_id: usize, reason: impl std::fmt::Display) -> Self {
        Self {
            worker_id,
            outcome: Err(RunError::worker(worker_id, reason)),
        }
    }
}

/// Transport that runs workers
///
/// Implementations: [`ThreadPool`](super::local::ThreadPool) for in-process
/// threads, [`RemotePool`](crate::distributed::RemotePool) for node services
/// over TCP.
pub trait WorkerPool {
    /// Human-readable transport name for logs
    fn name(&self) -> &'static str;

    /// Start worker `i` on `assignments[i]` for every `i`
    ///
    /// Returns immediately. Reports arrive on the channel in completion
    /// order; a worker that dies without reporting drops its sender.
    fn dispatch(&mut self, workload: Workload, assignments: Vec<WorkRange>) -> Receiver<WorkerReport>;
}
