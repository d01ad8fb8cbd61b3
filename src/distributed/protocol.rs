//! Node protocol
//!
//! This module defines the protocol between the coordinator and worker nodes.
//! Messages are serialized with MessagePack (rmp-serde).
//!
//! # Protocol Version
//!
//! Current version: 1
//!
//! # Message Flow
//!
//! One connection carries exactly one worker assignment:
//!
//! ```text
//! Coordinator                     Worker Node
//!     |                              |
//!     |-------- CONFIG ------------->|   workload, total work, worker count
//!     |                              |
//!     |<------- READY ---------------|
//!     |                              |
//!     |-------- ASSIGN ------------->|   worker id + range
//!     |                              |
//!     |<------- PARTIAL -------------|   (or ERROR)
//! ```
//!
//! # Message Framing
//!
//! Each message is prefixed with a 4-byte length field (little-endian u32):
//!
//! ```text
//! [4 bytes: message length][N bytes: MessagePack-serialized message]
//! ```

use crate::partition::WorkRange;
use crate::worker::{PartialResult, Workload};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Protocol version
///
/// Coordinator and nodes must have matching protocol versions.
pub const PROTOCOL_VERSION: u32 = 1;

/// Largest accepted frame body
pub const MAX_MESSAGE_BYTES: usize = 100 * 1024 * 1024;

/// Protocol message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Run configuration (Coordinator → Node)
    ///
    /// Identical for every worker of a run.
    Config(ConfigMessage),

    /// Node accepted the configuration (Node → Coordinator)
    Ready(ReadyMessage),

    /// Work assignment for one worker (Coordinator → Node)
    Assign(AssignMessage),

    /// Partial result of the assigned worker (Node → Coordinator)
    Partial(PartialMessage),

    /// Node-side failure (Node → Coordinator)
    ///
    /// Coordinator fails the whole run.
    Error(ErrorMessage),
}

/// Configuration message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMessage {
    /// Protocol version (must match)
    pub protocol_version: u32,
    pub workload: Workload,
    /// Size of the whole index space `[0, total_work)`
    pub total_work: u64,
    pub worker_count: usize,
}

/// Ready message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyMessage {
    pub protocol_version: u32,
    /// Node identifier (hostname)
    pub node_id: String,
}

/// Assignment message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignMessage {
    pub worker_id: usize,
    pub range: WorkRange,
}

/// Partial result message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialMessage {
    pub node_id: String,
    pub worker_id: usize,
    pub result: WirePartial,
    /// Compute time on the node (nanoseconds)
    pub duration_ns: u64,
}

/// Error message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub node_id: String,
    /// Worker the error belongs to, if an assignment had been received
    pub worker_id: Option<usize>,
    pub error: String,
}

/// Wire form of [`PartialResult`]
///
/// Sums are split into two u64 halves; MessagePack has no 128-bit integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WirePartial {
    Sum { high: u64, low: u64 },
    Primes(Vec<u64>),
}

impl From<PartialResult> for WirePartial {
    fn from(partial: PartialResult) -> Self {
        match partial {
            PartialResult::Sum(sum) => WirePartial::Sum {
                high: (sum >> 64) as u64,
                low: sum as u64,
            },
            PartialResult::Primes(primes) => WirePartial::Primes(primes),
        }
    }
}

impl From<WirePartial> for PartialResult {
    fn from(wire: WirePartial) -> Self {
        match wire {
            WirePartial::Sum { high, low } => {
                PartialResult::Sum((u128::from(high) << 64) | u128::from(low))
            }
            WirePartial::Primes(primes) => PartialResult::Primes(primes),
        }
    }
}

/// Serialize a message to bytes
///
/// Prepends a 4-byte length field for framing.
pub fn serialize_message(msg: &Message) -> Result<Vec<u8>> {
    let msg_bytes = rmp_serde::to_vec(msg)
        .context("Failed to serialize message")?;

    if msg_bytes.len() > MAX_MESSAGE_BYTES {
        anyhow::bail!("Message too large: {} bytes (max 100MB)", msg_bytes.len());
    }

    let msg_len = msg_bytes.len() as u32;
    let mut framed = Vec::with_capacity(4 + msg_bytes.len());
    framed.extend_from_slice(&msg_len.to_le_bytes());
    framed.extend_from_slice(&msg_bytes);

    Ok(framed)
}

/// Deserialize a message from bytes
///
/// Returns (message, bytes_consumed) where bytes_consumed includes the length prefix.
pub fn deserialize_message(buf: &[u8]) -> Result<(Message, usize)> {
    if buf.len() < 4 {
        anyhow::bail!("Buffer too small for message length (need 4 bytes, got {})", buf.len());
    }

    let msg_len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;

    if buf.len() < 4 + msg_len {
        anyhow::bail!("Incomplete message (need {} bytes, got {})", 4 + msg_len, buf.len());
    }

    let msg = rmp_serde::from_slice(&buf[4..4 + msg_len])
        .context("Failed to deserialize message")?;

    Ok((msg, 4 + msg_len))
}

/// Read one complete message from a stream
pub async fn read_message<R>(stream: &mut R) -> Result<Message>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await
        .context("Failed to read message length")?;

    let msg_len = u32::from_le_bytes(len_buf) as usize;

    if msg_len > MAX_MESSAGE_BYTES {
        anyhow::bail!("Message too large: {} bytes (max 100MB)", msg_len);
    }

    let mut msg_buf = vec![0u8; msg_len];
    stream.read_exact(&mut msg_buf).await
        .context("Failed to read message body")?;

    let msg = rmp_serde::from_slice(&msg_buf)
        .context("Failed to deserialize message")?;

    Ok(msg)
}

/// Write a message to a stream and flush it
pub async fn write_message<W>(stream: &mut W, msg: &Message) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let framed = serialize_message(msg)?;

    stream.write_all(&framed).await
        .context("Failed to write message")?;

    stream.flush().await
        .context("Failed to flush stream")?;

    Ok(())
}
