//! # opc-ua-browser
//!
//! Client-side browser for a hierarchical OPC UA address space: walks the
//! node tree, classifies every readable variable by its runtime value type,
//! and keeps a type-grouped inventory fresh on a fixed poll interval so a
//! caller can pick a node by name and read it or write a type-converted
//! value back.
//!
//! The wire transport stays behind [`opc_ua_client::UaSession`]; everything
//! here is pure client logic over that seam.

mod classify;
mod convert;
mod error;
mod inventory;
mod locator;
mod poller;
mod service;
mod tag;

// Stable public API
pub use classify::classify;
pub use convert::{ConvertError, parse_value, render_lines, render_value};
pub use error::{BrowserError, BrowserResult};
pub use inventory::{Inventory, build_inventory};
pub use locator::{display_name_of_entry, find_by_name};
pub use poller::{Poller, PollerState};
pub use service::{Browser, BrowserConfig};
pub use tag::{TypeTag, VALID_TAGS};
