//! A blocking TCP connection to a CAD plugin.

use std::io::{self, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;

use crate::plugin::envelope::{Command, Response};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::framing::receive_full_response;
use crate::plugin::PluginClient;

/// A connection to the plugin's socket server.
///
/// Holds at most one [`TcpStream`]. The stream is opened lazily, assumed
/// usable until an exchange fails, and dropped on any transport fault so the
/// next command reconnects. The stream mutex is held for a whole exchange,
/// so commands on one connection never interleave.
#[derive(Debug)]
pub struct PluginConnection {
    plugin: &'static str,
    host: String,
    port: u16,
    timeout: Duration,
    stream: Mutex<Option<TcpStream>>,
}

impl PluginConnection {
    /// Creates a disconnected connection.
    ///
    /// `plugin` is the display name used in log lines and error messages.
    #[must_use]
    pub fn new(plugin: &'static str, host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            plugin,
            host: host.into(),
            port,
            timeout,
            stream: Mutex::new(None),
        }
    }

    /// Returns the plugin display name.
    #[must_use]
    pub const fn plugin(&self) -> &'static str {
        self.plugin
    }

    /// Returns the plugin host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the plugin port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the response deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns `true` if a socket handle is currently held.
    ///
    /// This does not probe the socket; a peer that went away is only
    /// noticed by the next exchange.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.lock_stream().is_some()
    }

    /// Opens the socket if none is held.
    ///
    /// Does nothing when a handle is already present.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotConnected`] if the connect attempt fails.
    pub fn connect(&self) -> PluginResult<()> {
        let mut slot = self.lock_stream();
        if slot.is_none() {
            *slot = Some(self.open_stream()?);
        }
        Ok(())
    }

    /// Closes the socket if one is held. Safe to call when disconnected.
    pub fn disconnect(&self) {
        let Some(stream) = self.lock_stream().take() else {
            return;
        };

        match stream.shutdown(Shutdown::Both) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotConnected => {
                tracing::debug!("Peer had already closed the connection");
            }
            Err(e) => {
                tracing::error!(error = %e, plugin = self.plugin, "Error disconnecting");
            }
        }
        tracing::info!(plugin = self.plugin, "Disconnected");
    }

    /// Sends one command and waits for its response.
    ///
    /// Connects first if needed. Returns the `result` field of a successful
    /// response, or `{}` when the plugin sent none.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Remote`] when the plugin reports a failure (the
    /// socket is kept), or a transport error (the socket is dropped).
    pub fn send_command(&self, command_type: &str, params: Value) -> PluginResult<Value> {
        let mut slot = self.lock_stream();

        let mut stream = match slot.take() {
            Some(stream) => stream,
            None => self.open_stream()?,
        };

        let command = Command::new(command_type, params);
        tracing::info!(command = command_type, "Sending command");
        tracing::debug!(params = %command.params, "Command params");

        match self.exchange(&mut stream, &command) {
            Ok(result) => {
                *slot = Some(stream);
                Ok(result)
            }
            Err(e) if !e.invalidates_connection() => {
                *slot = Some(stream);
                Err(e)
            }
            Err(e) => {
                tracing::error!(error = %e, command = command_type, "Dropping plugin socket");
                Err(e)
            }
        }
    }

    fn exchange(&self, stream: &mut TcpStream, command: &Command<'_>) -> PluginResult<Value> {
        let timeout_secs = self.timeout.as_secs_f64();
        let to_error = |e: io::Error| PluginError::from_io(self.plugin, timeout_secs, e);

        let bytes = command.to_bytes()?;
        stream.set_write_timeout(Some(self.timeout)).map_err(to_error)?;
        stream.write_all(&bytes).map_err(to_error)?;
        stream.flush().map_err(to_error)?;
        tracing::debug!(bytes = bytes.len(), "Command sent, waiting for response");

        stream.set_read_timeout(Some(self.timeout)).map_err(to_error)?;
        let value = receive_full_response(stream, self.plugin, timeout_secs)?;

        let response = Response::from_value(self.plugin, value)?;
        tracing::info!(status = response.status(), "Response status");

        let result = response.into_result(self.plugin);
        if let Err(PluginError::Remote { message }) = &result {
            tracing::error!(plugin = self.plugin, message = %message, "Plugin reported an error");
        }
        result
    }

    fn open_stream(&self) -> PluginResult<TcpStream> {
        let not_connected = |source: io::Error| {
            tracing::error!(
                error = %source,
                host = %self.host,
                port = self.port,
                "Failed to connect to {}",
                self.plugin
            );
            PluginError::NotConnected {
                plugin: self.plugin,
                host: self.host.clone(),
                port: self.port,
                source,
            }
        };

        let addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(not_connected)?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    tracing::info!(host = %self.host, port = self.port, "Connected to {}", self.plugin);
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(not_connected(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no addresses")
        })))
    }

    fn lock_stream(&self) -> MutexGuard<'_, Option<TcpStream>> {
        self.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PluginClient for PluginConnection {
    fn send_command(&self, command_type: &str, params: Value) -> PluginResult<Value> {
        Self::send_command(self, command_type, params)
    }
}

impl Drop for PluginConnection {
    fn drop(&mut self) {
        self.disconnect();
    }
}
