use crate::types::NodeId;
use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Centralized error enum for the OPC UA session seam.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Connection establishment or session-state failure.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A browse request was rejected for one node.
    #[error("Browse failed on {node}: {message}")]
    Browse { node: NodeId, message: String },

    /// A read request was rejected for one node.
    #[error("Read failed on {node}: {message}")]
    Read { node: NodeId, message: String },

    /// A write request could not be delivered (distinct from a server-side
    /// `Bad` write status, which is carried in `WriteResult`).
    #[error("Write failed on {node}: {message}")]
    Write { node: NodeId, message: String },

    /// Server status code reported outside a write outcome.
    #[error("Server status {}", format_status(*.0))]
    Status(u32),

    /// An operation exceeded its configured deadline.
    #[error("{operation} timed out ({secs}s)")]
    Timeout { operation: &'static str, secs: u64 },

    /// Catch-all for unexpected internal failures.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for SessionError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Async task join failed: {err}"))
    }
}

/// Helper to format an OPC UA status code with a friendly hint.
pub fn format_status(code: u32) -> String {
    let hex = format!("0x{code:08X}");
    match friendly_status_hint(code) {
        Some(hint) => format!("{hex}: {hint}"),
        None => hex,
    }
}

/// Maps well-known OPC UA `Bad*` status codes to actionable user hints.
pub fn friendly_status_hint(code: u32) -> Option<&'static str> {
    match code {
        0x8005_0000 => Some("Communication error — the connection to the server was interrupted"),
        0x800A_0000 => Some("Request timed out — the server did not respond in time"),
        0x800D_0000 => Some("No session is active — connect before issuing requests"),
        0x801F_0000 => Some("Access denied — the session user lacks rights for this node"),
        0x8025_0000 => Some("Session id invalid — the server dropped this session"),
        0x8034_0000 => Some("Node id not found in the server address space (BadNodeIdUnknown)"),
        0x8035_0000 => Some("Attribute not supported by this node (BadAttributeIdInvalid)"),
        0x803A_0000 => Some("Node value is not readable (BadNotReadable)"),
        0x803B_0000 => Some("Server rejected write — the node is read-only (BadNotWritable)"),
        0x8074_0000 => {
            Some("Data type mismatch — server cannot accept the written value (BadTypeMismatch)")
        }
        _ => None,
    }
}
