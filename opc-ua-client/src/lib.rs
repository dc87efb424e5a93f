//! # opc-ua-client
//!
//! Session-seam types and trait for OPC UA node access.
//!
//! The wire protocol, security negotiation, and session lifecycle live behind
//! the [`UaSession`] trait; this crate defines the node identity types, the
//! typed value union, and the write outcome consumed by clients.
//!
//! ## Features
//! - `test-support`: Enables `MockUaSession` via `mockall`

mod errors;
mod session;
mod types;

// Stable public API
pub use errors::{SessionError, SessionResult, format_status, friendly_status_hint};
pub use session::{ConnectionState, UaSession};
pub use types::{NodeClass, NodeHandle, NodeId, Value, WriteResult, WriteStatus};

// Test support re-export
#[cfg(feature = "test-support")]
pub use session::MockUaSession;
