//! Run-level error taxonomy
//!
//! Every failure that ends a run is one of these. There is no partial success:
//! a single failing or silent worker fails the whole run.

use std::time::Duration;
use thiserror::Error;

/// Errors that abort a run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Malformed arguments, unknown mode, negative amount, zero workers
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker raised during computation or exited without reporting
    #[error("worker {worker_id} failed: {reason}")]
    WorkerFailure { worker_id: usize, reason: String },

    /// Workers that had not reported when the bounded wait expired
    #[error("workers {missing:?} did not report within {timeout:?}")]
    WorkerTimeout { missing: Vec<usize>, timeout: Duration },

    /// Result does not fit the accumulator
    #[error("arithmetic overflow: {0}")]
    Overflow(String),
}

impl RunError {
    /// Shorthand for `InvalidConfig`
    pub fn invalid(msg: impl Into<String>) -> Self {
        RunError::InvalidConfig(msg.into())
    }

    /// Wrap any worker-side error as a failure of that worker
    pub fn worker(worker_id: usize, reason: impl std::fmt::Display) -> Self {
        RunError::WorkerFailure {
            worker_id,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_worker_timeout() {
        let err = RunError::WorkerTimeout {
            missing: vec![1, 3],
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "workers [1, 3] did not report within 5s");
    }

    #[test]
    fn test_worker_wraps_reason() {
        let inner = RunError::Overflow("sum over [0, 10)".to_string());
        let err = RunError::worker(2, &inner);
        assert_eq!(
            err,
            RunError::WorkerFailure {
                worker_id: 2,
                reason: "arithmetic overflow: sum over [0, 10)".to_string(),
            }
        );
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = RunError::invalid("workers must be at least 1").into();
        let err = err.context("Failed to build run configuration");
        assert!(matches!(
            err.downcast_ref::<RunError>(),
            Some(RunError::InvalidConfig(_))
        ));
    }
}
