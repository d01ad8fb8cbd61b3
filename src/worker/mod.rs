//! Worker implementation
//!
//! A worker owns exactly one [`WorkRange`] and turns it into a
//! [`PartialResult`]. Workers share nothing: the range is an immutable copy and
//! the result is returned by value, so a worker can run on any thread or in
//! another process without synchronization.
//!
//! # Workloads
//!
//! - **Squares**: sum of `i²` over the index range ([`squares`])
//! - **Primes**: primes whose discovery rank falls in the range ([`primes`])
//!
//! # Example
//!
//! ```
//! use rangefold::partition::WorkRange;
//! use rangefold::worker::{PartialResult, Worker, Workload};
//!
//! let worker = Worker::new(0, Workload::Squares, WorkRange { start: 0, end: 4 });
//! assert_eq!(worker.run().unwrap(), PartialResult::Sum(14));
//! ```

pub mod primes;
pub mod squares;

use crate::error::RunError;
use crate::partition::WorkRange;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::debug;

/// The computation a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workload {
    /// Sum of squares over `[0, amount)`
    Squares,
    /// First `amount` primes
    Primes,
}

impl Workload {
    /// Compute the partial result for one range
    pub fn compute(self, range: WorkRange) -> Result<PartialResult, RunError> {
        match self {
            Workload::Squares => squares::compute_square_sum(range).map(PartialResult::Sum),
            Workload::Primes => {
                primes::extract_prime_range(range.start, range.end).map(PartialResult::Primes)
            }
        }
    }

    /// Identity element of this workload's reduction
    pub fn neutral(self) -> PartialResult {
        match self {
            Workload::Squares => PartialResult::Sum(0),
            Workload::Primes => PartialResult::Primes(Vec::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Workload::Squares => "squares",
            Workload::Primes => "primes",
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output of one worker, consumed once by the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialResult {
    /// Accumulated sum of squares
    Sum(u128),
    /// Discovered primes, ascending
    Primes(Vec<u64>),
}

impl PartialResult {
    /// Workload that produces this kind of partial
    pub fn workload(&self) -> Workload {
        match self {
            PartialResult::Sum(_) => Workload::Squares,
            PartialResult::Primes(_) => Workload::Primes,
        }
    }
}

/// One unit of execution: a worker id bound to its range
#[derive(Debug, Clone, Copy)]
pub struct Worker {
    id: usize,
    workload: Workload,
    range: WorkRange,
}

impl Worker {
    pub fn new(id: usize, workload: Workload, range: WorkRange) -> Self {
        Self { id, workload, range }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn range(&self) -> WorkRange {
        self.range
    }

    /// Compute this worker's partial result
    ///
    /// Empty ranges return the neutral element without scanning.
    pub fn run(&self) -> Result<PartialResult, RunError> {
        if self.range.is_empty() {
            debug!(worker = self.id, range = %self.range, "empty range, reporting neutral");
            return Ok(self.workload.neutral());
        }

        let start = Instant::now();
        let partial = self.workload.compute(self.range)?;
        debug!(
            worker = self.id,
            workload = %self.workload,
            range = %self.range,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "partial computed"
        );
        Ok(partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_squares() {
        let worker = Worker::new(1, Workload::Squares, WorkRange { start: 3, end: 6 });
        // 9 + 16 + 25
        assert_eq!(worker.run().unwrap(), PartialResult::Sum(50));
        assert_eq!(worker.id(), 1);
    }

    #[test]
    fn test_worker_primes() {
        let worker = Worker::new(0, Workload::Primes, WorkRange { start: 3, end: 6 });
        assert_eq!(worker.run().unwrap(), PartialResult::Primes(vec![7, 11, 13]));
    }

    #[test]
    fn test_worker_empty_range_reports_neutral() {
        let range = WorkRange { start: 5, end: 5 };
        assert_eq!(
            Worker::new(0, Workload::Squares, range).run().unwrap(),
            PartialResult::Sum(0)
        );
        assert_eq!(
            Worker::new(0, Workload::Primes, range).run().unwrap(),
            PartialResult::Primes(vec![])
        );
    }

    #[test]
    fn test_partial_workload() {
        assert_eq!(PartialResult::Sum(1).workload(), Workload::Squares);
        assert_eq!(PartialResult::Primes(vec![2]).workload(), Workload::Primes);
        assert_eq!(Workload::Primes.neutral().workload(), Workload::Primes);
    }

    #[test]
    fn test_workload_serde_name() {
        let json = serde_json::to_string(&Workload::Squares).unwrap();
        assert_eq!(json, "\"squares\"");
    }
}
