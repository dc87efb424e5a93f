use chrono::{DateTime, Utc};

/// Well-known node id of the Objects folder, the root container every
/// conformant server exposes under namespace 0.
const OBJECTS_FOLDER: &str = "i=85";

/// Opaque, server-assigned node identifier.
///
/// The string form (e.g. `"ns=2;s=Machine.MotorSpeed"`) is treated as a
/// token: equality-comparable and printable, never interpreted client-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The fixed traversal root (`i=85`, the Objects folder).
    pub fn objects_folder() -> Self {
        Self(OBJECTS_FOLDER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Node class, reduced to the distinction the browser consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Container node; may have children but exposes no readable value.
    Object,
    /// Node exposing a readable (and possibly writable) typed value.
    Variable,
}

/// Immutable client-side copy of one browsed node.
///
/// Returned by [`crate::UaSession::browse_children`]. Display names are not
/// guaranteed unique across the whole address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    /// Server-assigned identifier.
    pub node_id: NodeId,
    /// Human-readable name shown to operators.
    pub display_name: String,
    /// Object or Variable.
    pub node_class: NodeClass,
}

impl NodeHandle {
    pub fn new(
        node_id: impl Into<NodeId>,
        display_name: impl Into<String>,
        node_class: NodeClass,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            display_name: display_name.into(),
            node_class,
        }
    }

    pub fn is_variable(&self) -> bool {
        self.node_class == NodeClass::Variable
    }
}

/// Typed payload read from or written to a variable node.
///
/// Absence ("no value available") is expressed as `Option<Value>` at the
/// read seam, not as a variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int32(i32),
    Double(f64),
    Text(String),
    /// Raw byte payload (OPC UA `ByteString`).
    Bytes(Vec<u8>),
    /// Timestamp, always carried in UTC.
    DateTime(DateTime<Utc>),
    /// Homogeneous on well-behaved servers, but not enforced here.
    Array(Vec<Value>),
}

/// Outcome status of a write, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Good,
    Bad,
}

/// Result of a single write operation.
///
/// A `Bad` status is a reportable failure, not an `Err`: callers must
/// inspect [`WriteResult::status`] before treating the write as applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    /// Whether the server accepted the write.
    pub status: WriteStatus,
    /// Server status code (OPC UA `StatusCode` numeric form).
    pub code: u32,
    /// Human-readable description supplied by the server.
    pub description: String,
}

impl WriteResult {
    /// A successful write (`Good`, code 0).
    pub fn good() -> Self {
        Self {
            status: WriteStatus::Good,
            code: 0,
            description: "Good".to_string(),
        }
    }

    /// A rejected write with the server's code and description.
    pub fn bad(code: u32, description: impl Into<String>) -> Self {
        Self {
            status: WriteStatus::Bad,
            code,
            description: description.into(),
        }
    }

    pub fn is_good(&self) -> bool {
        self.status == WriteStatus::Good
    }
}
