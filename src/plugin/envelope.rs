//! Command and response envelopes exchanged with the plugin.
//!
//! ```text
//! bridge -> plugin   {"type": "create_object", "params": {...}}
//! plugin -> bridge   {"status": "success", "result": {...}}
//!                    {"status": "error", "message": "..."}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::plugin::error::{PluginError, PluginResult};

/// A command sent to the plugin.
#[derive(Debug, Clone, Serialize)]
pub struct Command<'a> {
    /// Remote operation name.
    #[serde(rename = "type")]
    pub command_type: &'a str,
    /// Operation arguments. Always an object on the wire.
    pub params: Value,
}

impl<'a> Command<'a> {
    /// Creates a command, replacing missing (`null`) params with `{}`.
    #[must_use]
    pub fn new(command_type: &'a str, params: Value) -> Self {
        let params = if params.is_null() {
            Value::Object(Map::new())
        } else {
            params
        };
        Self {
            command_type,
            params,
        }
    }

    /// Serialises the command to the bytes written on the socket.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Encode`] if serialisation fails.
    pub fn to_bytes(&self) -> PluginResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|source| PluginError::Encode {
            command: self.command_type.to_string(),
            source,
        })
    }
}

/// A response received from the plugin.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// `"success"` or `"error"`. Anything that is not `"error"` counts as success.
    #[serde(default)]
    pub status: Option<Value>,
    /// Operation result (success only).
    #[serde(default)]
    pub result: Option<Value>,
    /// Failure description (error only). Non-string messages are kept as JSON.
    #[serde(default)]
    pub message: Option<Value>,
}

impl Response {
    /// Interprets a decoded JSON value as a response envelope.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MalformedResponse`] if the value is not an object.
    pub fn from_value(plugin: &'static str, value: Value) -> PluginResult<Self> {
        if !value.is_object() {
            return Err(PluginError::MalformedResponse {
                plugin,
                message: "response is not a JSON object".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| PluginError::MalformedResponse {
            plugin,
            message: e.to_string(),
        })
    }

    /// Returns the status string, or `"unknown"` when absent.
    #[must_use]
    pub fn status(&self) -> &str {
        self.status.as_ref().and_then(Value::as_str).unwrap_or("unknown")
    }

    /// Returns `true` if the plugin reported a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status.as_ref().and_then(Value::as_str) == Some("error")
    }

    /// Converts the envelope into the command result.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Remote`] carrying the plugin's message when
    /// the status is `"error"`.
    pub fn into_result(self, plugin: &'static str) -> PluginResult<Value> {
        if self.is_error() {
            let message = match self.message {
                Some(Value::String(text)) => text,
                Some(Value::Null) | None => format!("Unknown error from {plugin}"),
                Some(other) => other.to_string(),
            };
            return Err(PluginError::Remote { message });
        }
        Ok(self.result.unwrap_or_else(|| Value::Object(Map::new())))
    }
}
