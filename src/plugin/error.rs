//! Error types for plugin socket operations.

use std::io;

use thiserror::Error;

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur while talking to a CAD plugin.
///
/// Every variant except [`PluginError::Remote`] and [`PluginError::Encode`]
/// describes a transport fault. Transport faults discard the cached socket so
/// the next command reconnects; see [`PluginError::invalidates_connection`].
#[derive(Debug, Error)]
pub enum PluginError {
    /// No socket and the connect attempt failed.
    #[error("Not connected to {plugin} at {host}:{port}. Make sure the {plugin} plugin is running")]
    NotConnected {
        /// Display name of the plugin.
        plugin: &'static str,
        /// Host the connection was attempted on.
        host: String,
        /// Port the connection was attempted on.
        port: u16,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The singleton accessor could not establish a connection.
    #[error("Could not connect to {plugin}. {hint}")]
    Unavailable {
        /// Display name of the plugin.
        plugin: &'static str,
        /// Guidance for the user.
        hint: &'static str,
        /// The connect failure.
        #[source]
        source: Box<PluginError>,
    },

    /// No complete response arrived within the configured deadline.
    #[error("Timeout waiting for {plugin} response after {timeout_secs:.1}s - try simplifying your request")]
    Timeout {
        /// Display name of the plugin.
        plugin: &'static str,
        /// Configured deadline in seconds.
        timeout_secs: f64,
    },

    /// The connection was reset or closed in the middle of an exchange.
    #[error("Connection to {plugin} lost: {source}")]
    ConnectionLost {
        /// Display name of the plugin.
        plugin: &'static str,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The peer closed the connection before sending a single byte.
    #[error("Connection closed by {plugin} before receiving any data")]
    EmptyResponse {
        /// Display name of the plugin.
        plugin: &'static str,
    },

    /// Bytes arrived but they are not a valid, complete response envelope.
    #[error("Invalid response from {plugin}: {message}")]
    MalformedResponse {
        /// Display name of the plugin.
        plugin: &'static str,
        /// Description of what's wrong.
        message: String,
    },

    /// Any other I/O fault during an exchange.
    #[error("Communication error with {plugin}: {source}")]
    Communication {
        /// Display name of the plugin.
        plugin: &'static str,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The command could not be serialised. Nothing was sent.
    #[error("Failed to encode command '{command}': {source}")]
    Encode {
        /// Command type.
        command: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The plugin replied with `status: "error"`.
    #[error("{message}")]
    Remote {
        /// Message supplied by the plugin, verbatim.
        message: String,
    },
}

impl PluginError {
    /// Returns `true` if this error means the socket can no longer be trusted.
    #[must_use]
    pub const fn invalidates_connection(&self) -> bool {
        !matches!(self, Self::Remote { .. } | Self::Encode { .. })
    }

    /// Returns `true` if the plugin itself reported the failure.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Classifies an I/O error raised in the middle of an exchange.
    pub(crate) fn from_io(plugin: &'static str, timeout_secs: f64, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout {
                plugin,
                timeout_secs,
            },
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof => Self::ConnectionLost { plugin, source },
            _ => Self::Communication { plugin, source },
        }
    }
}
