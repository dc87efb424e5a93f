use crate::errors::SessionResult;
use crate::types::{NodeHandle, NodeId, Value, WriteResult};
use async_trait::async_trait;

#[cfg(feature = "test-support")]
use mockall::automock;

/// Connection state of a session, as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Async trait for OPC UA session operations.
///
/// This is the stable public API. Transport implementations provide the
/// actual wire interaction; security negotiation and reconnect policy are
/// theirs to own.
#[cfg_attr(feature = "test-support", automock)]
#[async_trait]
pub trait UaSession: Send + Sync {
    /// Establish a session against `endpoint`. Idempotent: connecting an
    /// already-connected session is a no-op.
    ///
    /// # Errors
    /// Returns `Err` if the endpoint is unreachable or the server rejects
    /// session activation.
    async fn connect(&self, endpoint: &str) -> SessionResult<()>;

    /// Current transport-level connection state.
    fn state(&self) -> ConnectionState;

    /// Browse one hierarchy level below `node`.
    ///
    /// # Errors
    /// Returns `Err` if the session is down or the server rejects the
    /// browse request for this node.
    async fn browse_children(&self, node: &NodeId) -> SessionResult<Vec<NodeHandle>>;

    /// Read the current value of a variable node.
    ///
    /// `Ok(None)` means the node holds no value right now; that is an
    /// expected condition, not an error.
    ///
    /// # Errors
    /// Returns `Err` if the session is down or the server rejects the read.
    async fn read_value(&self, node: &NodeId) -> SessionResult<Option<Value>>;

    /// Write a value to a variable node.
    ///
    /// A server-side rejection is reported inside the returned
    /// [`WriteResult`], not as `Err`.
    ///
    /// # Errors
    /// Returns `Err` if the session is down or the request itself cannot be
    /// delivered.
    async fn write_value(&self, node: &NodeId, value: Value) -> SessionResult<WriteResult>;
}
