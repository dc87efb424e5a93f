use crate::convert::ConvertError;
use opc_ua_client::SessionError;
use thiserror::Error;

/// Result type alias for browser facade operations.
pub type BrowserResult<T> = Result<T, BrowserError>;

/// Caller-facing error taxonomy.
///
/// Node-level failures during a rebuild never surface here; they are
/// isolated inside the walk. These are the failures of the operations a
/// caller invokes directly.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BrowserError {
    /// Connection establishment or session-state failure; polling fell back
    /// to idle and a fresh start request is required.
    #[error("connection error: {0}")]
    Connection(#[source] SessionError),

    /// The requested display name has no match in the current inventory.
    #[error("no node named {name:?} in the current inventory")]
    NotFound { name: String },

    /// User-supplied text could not be converted to the node's type.
    #[error(transparent)]
    Conversion(#[from] ConvertError),

    /// The server returned a non-Good write status. The write was not
    /// applied; code and description are the server's own.
    #[error("server rejected write: {code:#010X} - {description}")]
    WriteRejected { code: u32, description: String },

    /// The named node's current value could not be read.
    #[error("read failed for {name:?}: {source}")]
    Read {
        name: String,
        #[source]
        source: SessionError,
    },

    /// The write request itself could not be delivered.
    #[error("write failed for {name:?}: {source}")]
    Write {
        name: String,
        #[source]
        source: SessionError,
    },
}
