//! Process-wide access to the plugin connection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;

use crate::plugin::connection::PluginConnection;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::PluginClient;

/// Where and how to reach a plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSettings {
    /// Plugin display name, e.g. `"Rhino"`.
    pub plugin: &'static str,
    /// Hint appended to "could not connect" errors.
    pub hint: &'static str,
    /// Plugin host.
    pub host: String,
    /// Plugin port.
    pub port: u16,
    /// Response deadline.
    pub timeout: Duration,
}

/// Owns the single shared [`PluginConnection`].
///
/// The connection is created on first use and handed out as an [`Arc`], so
/// every caller sees the same instance. A cached instance is returned as is;
/// a dead socket is only noticed and replaced inside
/// [`PluginConnection::send_command`].
#[derive(Debug)]
pub struct ConnectionManager {
    settings: ConnectionSettings,
    slot: Mutex<Option<Arc<PluginConnection>>>,
}

impl ConnectionManager {
    /// Creates a manager with an empty slot.
    #[must_use]
    pub const fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            slot: Mutex::new(None),
        }
    }

    /// Returns the connection settings.
    #[must_use]
    pub const fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Returns `true` if a connection instance is cached.
    #[must_use]
    pub fn has_connection(&self) -> bool {
        self.lock_slot().is_some()
    }

    /// Returns the shared connection, creating and connecting it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Unavailable`] if a new connection cannot be
    /// established. The slot stays empty so the next call tries again.
    pub fn get_connection(&self) -> PluginResult<Arc<PluginConnection>> {
        let mut slot = self.lock_slot();

        if let Some(connection) = slot.as_ref() {
            return Ok(Arc::clone(connection));
        }

        let connection = PluginConnection::new(
            self.settings.plugin,
            self.settings.host.clone(),
            self.settings.port,
            self.settings.timeout,
        );
        if let Err(e) = connection.connect() {
            tracing::error!("Failed to connect to {}", self.settings.plugin);
            return Err(PluginError::Unavailable {
                plugin: self.settings.plugin,
                hint: self.settings.hint,
                source: Box::new(e),
            });
        }

        tracing::info!("Created new persistent connection to {}", self.settings.plugin);
        let connection = Arc::new(connection);
        *slot = Some(Arc::clone(&connection));
        Ok(connection)
    }

    /// Disconnects and forgets the cached connection. Safe to call repeatedly.
    pub fn cleanup(&self) {
        let mut slot = self.lock_slot();
        if let Some(connection) = slot.take() {
            tracing::info!("Disconnecting from {}", self.settings.plugin);
            connection.disconnect();
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<Arc<PluginConnection>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PluginClient for ConnectionManager {
    fn send_command(&self, command_type: &str, params: Value) -> PluginResult<Value> {
        self.get_connection()?.send_command(command_type, params)
    }
}
