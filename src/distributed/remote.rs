//! Remote worker pool
//!
//! Worker `i` runs on node `i % nodes.len()`. Each worker gets its own
//! connection, and all connections proceed concurrently on a runtime owned
//! by the pool. Results are forwarded to the coordinator's channel, so the
//! barrier and timeout logic stay transport independent.

use crate::coordinator::pool::{WorkerPool, WorkerReport};
use crate::distributed::node_service::message_kind;
use crate::distributed::protocol::*;
use crate::error::RunError;
use crate::partition::WorkRange;
use crate::worker::{PartialResult, Workload};
use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tracing::debug;

/// Default per-connection time limit
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(300);

/// Pool of worker nodes reached over TCP
pub struct RemotePool {
    nodes: Vec<String>,
    runtime: Runtime,
    io_timeout: Duration,
}

impl RemotePool {
    /// Create a pool over `host:port` node addresses
    pub fn new(nodes: Vec<String>) -> Result<Self> {
        if nodes.is_empty() {
            anyhow::bail!("Remote pool needs at least one node address");
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("rangefold-remote")
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        Ok(Self {
            nodes,
            runtime,
            io_timeout: DEFAULT_IO_TIMEOUT,
        })
    }

    /// Abandon a connection that has not finished within `timeout`
    ///
    /// The worker is then reported as timed out, the same outcome the
    /// coordinator's own deadline produces.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Node address for a worker
    pub fn node_for(&self, worker_id: usize) -> &str {
        &self.nodes[worker_id % self.nodes.len()]
    }
}

impl WorkerPool for RemotePool {
    fn name(&self) -> &'static str {
        "remote nodes"
    }

    fn dispatch(&mut self, workload: Workload, assignments: Vec<WorkRange>) -> Receiver<WorkerReport> {
        let (tx, rx) = channel::unbounded();

        let config = ConfigMessage {
            protocol_version: PROTOCOL_VERSION,
            workload,
            total_work: assignments.last().map_or(0, |range| range.end),
            worker_count: assignments.len(),
        };

        for (worker_id, range) in assignments.into_iter().enumerate() {
            let addr = self.node_for(worker_id).to_string();
            let config = config.clone();
            let worker_tx = tx.clone();
            let io_timeout = self.io_timeout;

            debug!(worker = worker_id, node = %addr, range = %range, "dispatching to node");

            self.runtime.spawn(async move {
                let assign = AssignMessage { worker_id, range };
                let exchange = run_remote_worker(&addr, config, assign);
                let report = match tokio::time::timeout(io_timeout, exchange).await {
                    Ok(Ok(partial)) => WorkerReport::success(worker_id, partial),
                    Ok(Err(e)) => WorkerReport::failure(worker_id, format!("{:#}", e)),
                    Err(_) => {
                        debug!(worker = worker_id, node = %addr, "no reply before deadline");
                        WorkerReport {
                            worker_id,
                            outcome: Err(RunError::WorkerTimeout {
                                missing: vec![worker_id],
                                timeout: io_timeout,
                            }),
                        }
                    }
                };
                // Coordinator may have given up already
                let _ = worker_tx.send(report);
            });
        }

        rx
    }
}

/// Run one assignment on a node
async fn run_remote_worker(addr: &str, config: ConfigMessage, assign: AssignMessage) -> Result<PartialResult> {
    let mut stream = TcpStream::connect(addr).await
        .with_context(|| format!("Failed to connect to {}", addr))?;

    write_message(&mut stream, &Message::Config(config)).await?;

    match read_message(&mut stream).await.context("Failed to read READY")? {
        Message::Ready(ready) => {
            if ready.protocol_version != PROTOCOL_VERSION {
                anyhow::bail!(
                    "Protocol version mismatch: coordinator={}, node {}={}",
                    PROTOCOL_VERSION, ready.node_id, ready.protocol_version
                );
            }
        }
        Message::Error(err) => anyhow::bail!("Node {} error: {}", err.node_id, err.error),
        other => anyhow::bail!("Expected READY from {}, got {}", addr, message_kind(&other)),
    }

    write_message(&mut stream, &Message::Assign(assign)).await?;

    match read_message(&mut stream).await.context("Failed to read PARTIAL")? {
        Message::Partial(partial) => {
            if partial.worker_id != assign.worker_id {
                anyhow::bail!(
                    "Node {} answered for worker {} instead of {}",
                    partial.node_id, partial.worker_id, assign.worker_id
                );
            }
            debug!(
                worker = assign.worker_id,
                node = %partial.node_id,
                compute_ns = partial.duration_ns,
                "partial received"
            );
            Ok(partial.result.into())
        }
        Message::Error(err) => anyhow::bail!("Node {} error: {}", err.node_id, err.error),
        other => anyhow::bail!("Expected PARTIAL from {}, got {}", addr, message_kind(&other)),
    }
}
