//! Node service for distributed mode
//!
//! Runs on each host named in the coordinator's host list. The service:
//! - Listens for connections from the coordinator
//! - Receives the run configuration and answers READY
//! - Computes the assigned range on a blocking thread
//! - Sends the partial result (or an error) and closes the connection
//!
//! Connections are independent, so several workers can be placed on one node.

use crate::distributed::protocol::*;
use crate::error::RunError;
use crate::worker::Worker;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Default wait for CONFIG and ASSIGN on an accepted connection
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Node service
///
/// Accepts worker assignments from a coordinator.
pub struct NodeService {
    /// Address to bind
    bind: String,

    /// Port to listen on
    listen_port: u16,

    /// Node identifier (hostname)
    node_id: Arc<str>,

    /// Limit on each coordinator message read
    read_timeout: Duration,
}

impl NodeService {
    /// Create a new node service
    pub fn new(bind: impl Into<String>, listen_port: u16) -> Result<Self> {
        let node_id = get_node_id()?;

        Ok(Self {
            bind: bind.into(),
            listen_port,
            node_id: node_id.into(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// Drop connections whose coordinator goes quiet for `timeout`
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Bind the listening socket
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = format!("{}:{}", self.bind, self.listen_port);
        TcpListener::bind(&addr).await
            .with_context(|| format!("Failed to bind node service on {}", addr))
    }

    /// Run the node service until the listener fails
    pub async fn run(self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serve connections on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let local = listener.local_addr().context("Failed to read listener address")?;
        info!(node = %self.node_id, addr = %local, "node service listening");

        loop {
            let (stream, peer) = listener.accept().await
                .context("Failed to accept connection")?;

            debug!(peer = %peer, "coordinator connected");

            let node_id = Arc::clone(&self.node_id);
            let read_timeout = self.read_timeout;
            tokio::spawn(async move {
                if let Err(e) = handle_connection(node_id, stream, peer, read_timeout).await {
                    warn!(peer = %peer, "assignment failed: {:#}", e);
                }
            });
        }
    }
}

/// Handle one CONFIG → READY → ASSIGN → PARTIAL exchange
async fn handle_connection(
    node_id: Arc<str>,
    mut stream: TcpStream,
    peer: SocketAddr,
    read_timeout: Duration,
) -> Result<()> {
    let config = match read_within(&mut stream, read_timeout, "CONFIG").await? {
        Message::Config(config) => config,
        other => {
            let error = format!("Expected CONFIG, got {}", message_kind(&other));
            send_error(&mut stream, &node_id, None, &error).await?;
            anyhow::bail!(error)
        }
    };

    if config.protocol_version != PROTOCOL_VERSION {
        let error = format!(
            "Protocol version mismatch: coordinator={}, node={}",
            config.protocol_version, PROTOCOL_VERSION
        );
        send_error(&mut stream, &node_id, None, &error).await?;
        anyhow::bail!(error)
    }

    debug!(
        peer = %peer,
        workload = %config.workload,
        total_work = config.total_work,
        workers = config.worker_count,
        "received configuration"
    );

    let ready = ReadyMessage {
        protocol_version: PROTOCOL_VERSION,
        node_id: node_id.to_string(),
    };
    write_message(&mut stream, &Message::Ready(ready)).await?;

    let assign = match read_within(&mut stream, read_timeout, "ASSIGN").await? {
        Message::Assign(assign) => assign,
        other => {
            let error = format!("Expected ASSIGN, got {}", message_kind(&other));
            send_error(&mut stream, &node_id, None, &error).await?;
            anyhow::bail!(error)
        }
    };

    if let Err(e) = check_assignment(&config, &assign) {
        let error = e.to_string();
        send_error(&mut stream, &node_id, Some(assign.worker_id), &error).await?;
        anyhow::bail!(error)
    }

    let worker = Worker::new(assign.worker_id, config.workload, assign.range);
    let start = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || worker.run()).await;
    let duration = start.elapsed();

    let reply = match outcome {
        Ok(Ok(partial)) => {
            debug!(worker = assign.worker_id, range = %assign.range, ?duration, "assignment computed");
            Message::Partial(PartialMessage {
                node_id: node_id.to_string(),
                worker_id: assign.worker_id,
                result: partial.into(),
                duration_ns: duration.as_nanos() as u64,
            })
        }
        Ok(Err(e)) => error_message(&node_id, Some(assign.worker_id), e.to_string()),
        Err(e) => error_message(&node_id, Some(assign.worker_id), format!("worker task failed: {}", e)),
    };

    write_message(&mut stream, &reply).await
}

/// Read one message, giving up after `limit`
async fn read_within(stream: &mut TcpStream, limit: Duration, expected: &str) -> Result<Message> {
    match tokio::time::timeout(limit, read_message(stream)).await {
        Ok(msg) => msg.with_context(|| format!("Failed to read {}", expected)),
        Err(_) => anyhow::bail!("No {} from coordinator within {:?}", expected, limit),
    }
}

/// Reject assignments that do not fit the announced run
fn check_assignment(config: &ConfigMessage, assign: &AssignMessage) -> Result<(), RunError> {
    if assign.worker_id >= config.worker_count {
        return Err(RunError::invalid(format!(
            "worker id {} outside run of {} workers",
            assign.worker_id, config.worker_count
        )));
    }
    if assign.range.start > assign.range.end || assign.range.end > config.total_work {
        return Err(RunError::invalid(format!(
            "range {} outside [0, {})",
            assign.range, config.total_work
        )));
    }
    Ok(())
}

fn error_message(node_id: &str, worker_id: Option<usize>, error: String) -> Message {
    Message::Error(ErrorMessage {
        node_id: node_id.to_string(),
        worker_id,
        error,
    })
}

async fn send_error(stream: &mut TcpStream, node_id: &str, worker_id: Option<usize>, error: &str) -> Result<()> {
    write_message(stream, &error_message(node_id, worker_id, error.to_string())).await
}

pub(crate) fn message_kind(msg: &Message) -> &'static str {
    match msg {
        Message::Config(_) => "CONFIG",
        Message::Ready(_) => "READY",
        Message::Assign(_) => "ASSIGN",
        Message::Partial(_) => "PARTIAL",
        Message::Error(_) => "ERROR",
    }
}

/// Get node identifier (hostname)
fn get_node_id() -> Result<String> {
    if let Ok(hostname) = hostname::get() {
        if let Ok(hostname_str) = hostname.into_string() {
            return Ok(hostname_str);
        }
    }

    Ok("unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::WorkRange;
    use crate::worker::{PartialResult, Workload};

    async fn start_node() -> SocketAddr {
        let service = NodeService::new("127.0.0.1", 0).unwrap();
        let listener = service.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(service.serve(listener));
        addr
    }

    fn config(workload: Workload, total_work: u64, worker_count: usize) -> Message {
        Message::Config(ConfigMessage {
            protocol_version: PROTOCOL_VERSION,
            workload,
            total_work,
            worker_count,
        })
    }

    #[test]
    fn test_get_node_id() {
        let node_id = get_node_id().unwrap();
        assert!(!node_id.is_empty());
    }

    #[test]
    fn test_check_assignment() {
        let cfg = ConfigMessage {
            protocol_version: PROTOCOL_VERSION,
            workload: Workload::Squares,
            total_work: 10,
            worker_count: 2,
        };
        let ok = AssignMessage { worker_id: 1, range: WorkRange { start: 5, end: 10 } };
        let bad_id = AssignMessage { worker_id: 2, range: WorkRange { start: 5, end: 10 } };
        let bad_range = AssignMessage { worker_id: 0, range: WorkRange { start: 5, end: 11 } };

        assert!(check_assignment(&cfg, &ok).is_ok());
        assert!(matches!(check_assignment(&cfg, &bad_id), Err(RunError::InvalidConfig(_))));
        assert!(matches!(check_assignment(&cfg, &bad_range), Err(RunError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_full_exchange() {
        let addr = start_node().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        write_message(&mut stream, &config(Workload::Squares, 10, 2)).await.unwrap();
        match read_message(&mut stream).await.unwrap() {
            Message::Ready(ready) => assert_eq!(ready.protocol_version, PROTOCOL_VERSION),
            other => panic!("unexpected {:?}", other),
        }

        let assign = AssignMessage { worker_id: 1, range: WorkRange { start: 5, end: 10 } };
        write_message(&mut stream, &Message::Assign(assign)).await.unwrap();
        match read_message(&mut stream).await.unwrap() {
            Message::Partial(partial) => {
                assert_eq!(partial.worker_id, 1);
                // 25 + 36 + 49 + 64 + 81
                assert_eq!(PartialResult::from(partial.result), PartialResult::Sum(255));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_version_mismatch_reports_error() {
        let addr = start_node().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let msg = Message::Config(ConfigMessage {
            protocol_version: PROTOCOL_VERSION + 1,
            workload: Workload::Primes,
            total_work: 10,
            worker_count: 1,
        });
        write_message(&mut stream, &msg).await.unwrap();

        match read_message(&mut stream).await.unwrap() {
            Message::Error(err) => assert!(err.error.contains("Protocol version mismatch")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_out_of_bounds_assignment_reports_error() {
        let addr = start_node().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        write_message(&mut stream, &config(Workload::Primes, 10, 1)).await.unwrap();
        read_message(&mut stream).await.unwrap();

        let assign = AssignMessage { worker_id: 0, range: WorkRange { start: 0, end: 20 } };
        write_message(&mut stream, &Message::Assign(assign)).await.unwrap();
        match read_message(&mut stream).await.unwrap() {
            Message::Error(err) => assert_eq!(err.worker_id, Some(0)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unexpected_first_message() {
        let addr = start_node().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let assign = AssignMessage { worker_id: 0, range: WorkRange { start: 0, end: 1 } };
        write_message(&mut stream, &Message::Assign(assign)).await.unwrap();
        match read_message(&mut stream).await.unwrap() {
            Message::Error(err) => assert!(err.error.contains("Expected CONFIG")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quiet_coordinator_connection_dropped() {
        let service = NodeService::new("127.0.0.1", 0)
            .unwrap()
            .with_read_timeout(Duration::from_millis(100));
        let listener = service.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(service.serve(listener));

        // Connect and send nothing: the node must close its side
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let closed = tokio::time::timeout(Duration::from_secs(5), read_message(&mut stream)).await;
        assert!(matches!(closed, Ok(Err(_))));
    }
}
