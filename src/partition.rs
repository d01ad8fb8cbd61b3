//! Work partitioning
//!
//! Splits the index space `[0, total_work)` into one contiguous, half-open
//! [`WorkRange`] per worker. The tiling is always exact: ranges are disjoint,
//! gap-free and ordered by worker id.
//!
//! # Policy
//!
//! `chunk = total_work / worker_count` (truncating). Worker `i` gets
//! `[i * chunk, (i + 1) * chunk)`, except the last worker whose end is
//! `total_work`, so it absorbs the remainder.
//!
//! ```text
//! total_work = 10, worker_count = 3
//!
//!   worker 0: [0, 3)
//!   worker 1: [3, 6)
//!   worker 2: [6, 10)   <- remainder
//! ```
//!
//! When `worker_count > total_work` the chunk is zero and every worker except
//! the last receives an empty range. Those workers still report (a neutral
//! partial) so the coordinator always collects exactly `worker_count` results.

use crate::error::RunError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open interval `[start, end)` of the index space owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkRange {
    pub start: u64,
    pub end: u64,
}

impl WorkRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: u64, end: u64) -> Result<Self, RunError> {
        if start > end {
            return Err(RunError::invalid(format!(
                "range start {} exceeds end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of indices in the range
    #[inline]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Iterate over the indices in the range
    pub fn iter(&self) -> std::ops::Range<u64> {
        self.start..self.end
    }
}

impl fmt::Display for WorkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Largest accepted worker count
///
/// Each worker is an OS thread or a TCP connection.
pub const MAX_WORKERS: usize = 4096;

/// Compute each worker's range
///
/// Returns exactly `worker_count` ranges, indexed by worker id.
///
/// # Errors
///
/// `InvalidConfig` when `worker_count` is zero or above [`MAX_WORKERS`].
///
/// # Example
///
/// ```
/// use rangefold::partition::{partition, WorkRange};
///
/// let ranges = partition(10, 3).unwrap();
/// assert_eq!(ranges[2], WorkRange { start: 6, end: 10 });
/// ```
pub fn partition(total_work: u64, worker_count: usize) -> Result<Vec<WorkRange>, RunError> {
    if worker_count == 0 {
        return Err(RunError::invalid("worker count must be at least 1"));
    }
    if worker_count > MAX_WORKERS {
        return Err(RunError::invalid(format!(
            "worker count {} exceeds the maximum of {}",
            worker_count, MAX_WORKERS
        )));
    }

    let workers = worker_count as u64;
    let chunk = total_work / workers;

    let ranges = (0..workers)
        .map(|i| {
            let start = i * chunk;
            let end = if i == workers - 1 {
                total_work
            } else {
                (i + 1) * chunk
            };
            WorkRange { start, end }
        })
        .collect();

    Ok(ranges)
}
