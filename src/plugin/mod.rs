//! Socket transport to the CAD plugins.
//!
//! Both plugins (Rhino and Grasshopper) run a TCP server inside the host
//! application. The bridge sends one JSON command, then blocks until one JSON
//! response has arrived:
//!
//! ```text
//! ┌──────────────┐   {"type": ..., "params": {...}}   ┌──────────────┐
//! │    bridge    │ ─────────────────────────────────▶ │    plugin    │
//! │ (this crate) │ ◀───────────────────────────────── │ (in the CAD  │
//! └──────────────┘  {"status": ..., "result": ...}    │  application)│
//!                                                     └──────────────┘
//! ```
//!
//! Only one command is in flight per connection. Transport faults drop the
//! socket and the next command reconnects; plugin-reported errors leave the
//! socket alone.

pub mod connection;
pub mod envelope;
pub mod error;
pub mod framing;
pub mod manager;

pub use connection::PluginConnection;
pub use envelope::{Command, Response};
pub use error::{PluginError, PluginResult};
pub use manager::{ConnectionManager, ConnectionSettings};

use serde_json::Value;

/// Anything that can execute a plugin command.
///
/// Implemented by [`PluginConnection`] and by [`ConnectionManager`], which
/// resolves the shared connection on each call.
pub trait PluginClient: Send + Sync {
    /// Sends `command_type` with `params` and returns the command result.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if the exchange fails or the plugin reports an error.
    fn send_command(&self, command_type: &str, params: Value) -> PluginResult<Value>;
}
