//! rangefold - partitioned range computation with a reducing coordinator
//!
//! A coordinator splits the index space `[0, N)` into contiguous ranges, one
//! per worker, waits for every partial result and folds them into one value.
//!
//! # Workloads
//!
//! - **Squares**: sum of `i²` for `i` in `[0, N)`
//! - **Primes**: the first `N` primes, partitioned by prime rank
//!
//! # Modes
//!
//! - **Single**: one sequential computation, no partitioning
//! - **Distributed**: workers on local threads, or on remote
//!   `rangefold-node` services over TCP

pub mod app;
pub mod config;
pub mod coordinator;
pub mod distributed;
pub mod error;
pub mod output;
pub mod partition;
pub mod reducer;
pub mod worker;

// Re-export commonly used types
pub use config::{Mode, RunConfig};
pub use coordinator::{Coordinator, FinalResult};
pub use error::RunError;
pub use partition::{partition, WorkRange};
pub use worker::{PartialResult, Workload};

/// Result type used throughout rangefold
pub type Result<T> = anyhow::Result<T>;
