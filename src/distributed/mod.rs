//! Distributed mode implementation
//!
//! # Architecture
//!
//! - **Coordinator**: partitions the work, sends one assignment per worker,
//!   waits for every partial result and reduces them
//! - **Node Service**: runs on each host, computes assigned ranges
//! - **Remote pool**: places worker `i` on node `i % nodes` and forwards
//!   node replies to the coordinator
//!
//! # Modules
//!
//! - `protocol`: Message definitions and serialization
//! - `node_service`: Node service implementation
//! - `remote`: Worker pool backed by node services

pub mod node_service;
pub mod protocol;
pub mod remote;

// Re-export key types
pub use protocol::{
    AssignMessage,
    ConfigMessage,
    ErrorMessage,
    Message,
    PartialMessage,
    ReadyMessage,
    WirePartial,
    PROTOCOL_VERSION,
};

pub use node_service::NodeService;
pub use remote::RemotePool;
