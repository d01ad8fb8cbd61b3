//! In-process worker pool
//!
//! One OS thread per worker. Each thread owns a copy of its range and a clone
//! of the report sender; a panic inside a worker is caught and reported as a
//! failure of that worker.

use super::pool::{WorkerPool, WorkerReport};
use crate::partition::WorkRange;
use crate::worker::{Worker, Workload};
use crossbeam::channel::{self, Receiver};
use std::panic;
use std::thread;
use tracing::debug;

/// Thread-per-worker pool
#[derive(Debug, Default)]
pub struct ThreadPool;

impl ThreadPool {
    pub fn new() -> Self {
        Self
    }
}

impl WorkerPool for ThreadPool {
    fn name(&self) -> &'static str {
        "local threads"
    }

    fn dispatch(&mut self, workload: Workload, assignments: Vec<WorkRange>) -> Receiver<WorkerReport> {
        let (tx, rx) = channel::unbounded();

        for (worker_id, range) in assignments.into_iter().enumerate() {
            let worker = Worker::new(worker_id, workload, range);
            let worker_tx = tx.clone();

            let spawned = thread::Builder::new()
                .name(format!("rangefold-worker-{}", worker_id))
                .spawn(move || {
                    let report = match panic::catch_unwind(move || worker.run()) {
                        Ok(outcome) => WorkerReport {
                            worker_id,
                            outcome,
                        },
                        Err(_) => WorkerReport::failure(worker_id, "worker thread panicked"),
                    };
                    // Coordinator may have given up already
                    let _ = worker_tx.send(report);
                });

            match spawned {
                Ok(_) => debug!(worker = worker_id, range = %range, "worker thread started"),
                Err(e) => {
                    let _ = tx.send(WorkerReport::failure(
                        worker_id,
                        format!("failed to spawn thread: {}", e),
                    ));
                }
            }
        }

        rx
    }
}
