//! Bridge tool sets.
//!
//! A bridge turns MCP tool calls into plugin commands. Both bridges share
//! the same flow:
//!
//! 1. validate the arguments locally ([`Args`])
//! 2. build the command `params` ([`Params`])
//! 3. send the command through a [`PluginClient`]
//! 4. render the plugin result as pretty JSON with `"success": true` merged in
//!
//! Any failure along the way becomes a `{"success": false, "message": ...}`
//! result flagged `isError`, so a failed operation never takes the server
//! down.

pub mod args;
pub mod grasshopper;
pub mod rhino;

pub use args::{format_result_ids, parse_color, parse_point, Args, Params, Rgb};
pub use grasshopper::GrasshopperBridge;
pub use rhino::RhinoBridge;

use serde_json::{json, Value};
use thiserror::Error;

use crate::mcp::server::{ToolCallResult, ToolDefinition};
use crate::plugin::{PluginClient, PluginError};

/// The two bridge servers shipped by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeKind {
    /// Rhino 3D modelling.
    Rhino,
    /// Grasshopper definition editing.
    Grasshopper,
}

impl BridgeKind {
    /// MCP server name reported during initialisation.
    #[must_use]
    pub const fn server_name(self) -> &'static str {
        match self {
            Self::Rhino => "rhino-mcp",
            Self::Grasshopper => "grasshopper-mcp",
        }
    }

    /// Plugin display name used in logs and error messages.
    #[must_use]
    pub const fn plugin_name(self) -> &'static str {
        match self {
            Self::Rhino => "Rhino",
            Self::Grasshopper => "Grasshopper",
        }
    }

    /// Prefix of the environment variables read by [`crate::config::Config::apply_env`].
    #[must_use]
    pub const fn env_prefix(self) -> &'static str {
        match self {
            Self::Rhino => "RHINO_MCP",
            Self::Grasshopper => "GRASSHOPPER_MCP",
        }
    }

    /// Port the plugin listens on unless configured otherwise.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Rhino => 1999,
            Self::Grasshopper => 2000,
        }
    }

    /// Guidance appended to "could not connect" errors.
    #[must_use]
    pub const fn connect_hint(self) -> &'static str {
        match self {
            Self::Rhino => "Make sure the Rhino plugin is running.",
            Self::Grasshopper => {
                "Make sure the Grasshopper plugin is running (GHMCPStart command)."
            }
        }
    }

    /// Returns the tool set for this bridge.
    #[must_use]
    pub fn bridge(self) -> &'static dyn Bridge {
        match self {
            Self::Rhino => &RhinoBridge,
            Self::Grasshopper => &GrasshopperBridge,
        }
    }
}

/// Why a tool call failed.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The arguments failed local validation; nothing was sent.
    #[error("{0}")]
    InvalidArguments(String),

    /// The plugin command failed.
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// The plugin answered with data the tool cannot use.
    #[error("{0}")]
    InvalidResult(String),
}

/// Outcome of one tool handler.
pub type ToolResult = Result<ToolCallResult, ToolError>;

/// A set of MCP tools backed by one plugin.
pub trait Bridge: Send + Sync {
    /// Which bridge this is.
    fn kind(&self) -> BridgeKind;

    /// Definitions returned by `tools/list`.
    fn tool_definitions(&self) -> Vec<ToolDefinition>;

    /// Runs tool `name`. Returns `None` if the tool does not exist.
    fn dispatch(&self, name: &str, args: &Args<'_>, client: &dyn PluginClient)
        -> Option<ToolResult>;

    /// Runs tool `name` and renders every outcome as a tool result.
    fn call_tool(&self, name: &str, arguments: &Value, client: &dyn PluginClient) -> ToolCallResult {
        tracing::debug!(tool = name, "Calling tool");

        let outcome = match Args::new(arguments) {
            Ok(args) => self.dispatch(name, &args, client),
            Err(e) => Some(Err(e)),
        };

        match outcome {
            None => {
                tracing::warn!(tool = name, "Unknown tool");
                failure(&format!("Unknown tool: {name}"))
            }
            Some(Ok(result)) => result,
            Some(Err(e)) => {
                tracing::error!(tool = name, error = %e, "Tool call failed");
                failure(&e.to_string())
            }
        }
    }
}

/// Renders a plugin result as a successful tool result.
///
/// Objects get `"success": true` unless they already carry a `success` key;
/// any other value is wrapped as `{"success": true, "result": value}`.
#[must_use]
pub fn success(result: Value) -> ToolCallResult {
    let body = match result {
        Value::Object(mut map) => {
            map.entry("success").or_insert(Value::Bool(true));
            Value::Object(map)
        }
        other => json!({ "success": true, "result": other }),
    };
    ToolCallResult::text(pretty(&body))
}

/// Renders a failure as `{"success": false, "message": ...}` with `isError` set.
#[must_use]
pub fn failure(message: &str) -> ToolCallResult {
    ToolCallResult::error(pretty(&json!({ "success": false, "message": message })))
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}


#[cfg(test)]
mod tests {
    use super::testing::{body, RecordingClient};
    use super::*;

    #[test]
    fn bridge_kind_defaults() {
        assert_eq!(BridgeKind::Rhino.default_port(), 1999);
        assert_eq!(BridgeKind::Grasshopper.default_port(), 2000);
        assert_eq!(BridgeKind::Rhino.env_prefix(), "RHINO_MCP");
        assert_eq!(BridgeKind::Grasshopper.server_name(), "grasshopper-mcp");
        assert_eq!(BridgeKind::Rhino.bridge().kind(), BridgeKind::Rhino);
        assert_eq!(
            BridgeKind::Grasshopper.bridge().kind(),
            BridgeKind::Grasshopper
        );
    }

    #[test]
    fn success_merges_flag() {
        let result = success(json!({"id": "abc"}));
        assert!(!result.is_error);
        assert_eq!(body(&result), json!({"success": true, "id": "abc"}));
    }

    #[test]
    fn success_wraps_non_objects() {
        let result = success(json!(["a", "b"]));
        assert_eq!(body(&result), json!({"success": true, "result": ["a", "b"]}));
    }

    #[test]
    fn failure_shape() {
        let result = failure("boom");
        assert!(result.is_error);
        assert_eq!(body(&result), json!({"success": false, "message": "boom"}));
    }

    #[test]
    fn unknown_tool_is_error_result() {
        let client = RecordingClient::default();
        let result = BridgeKind::Rhino
            .bridge()
            .call_tool("no_such_tool", &json!({}), &client);
        assert!(result.is_error);
        assert_eq!(body(&result)["message"], "Unknown tool: no_such_tool");
        assert!(client.sent().is_empty());
    }

    #[test]
    fn every_listed_tool_dispatches() {
        for kind in [BridgeKind::Rhino, BridgeKind::Grasshopper] {
            let bridge = kind.bridge();
            let definitions = bridge.tool_definitions();
            assert!(!definitions.is_empty());

            let empty = Value::Null;
            let args = Args::new(&empty).unwrap();
            for tool in &definitions {
                assert!(tool.input_schema.is_object(), "{} schema", tool.name);
                let client = RecordingClient::default();
                assert!(
                    bridge.dispatch(&tool.name, &args, &client).is_some(),
                    "{} is listed but not dispatched",
                    tool.name
                );
            }
        }
    }

    #[test]
    fn plugin_failure_becomes_error_result() {
        let client = RecordingClient::failing("Object not found");
        let result = BridgeKind::Rhino.bridge().call_tool(
            "get_object_info",
            &json!({"id": "missing"}),
            &client,
        );
        assert!(result.is_error);
        assert_eq!(
            body(&result),
            json!({"success": false, "message": "Object not found"})
        );
    }
}
