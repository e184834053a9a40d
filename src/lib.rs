//! rhino-grasshopper-mcp: MCP bridge servers for Rhino and Grasshopper
//!
//! This library lets AI assistants drive Rhino 3D and Grasshopper through the
//! Model Context Protocol. Each bridge is a small MCP server on stdio that
//! forwards tool calls to a plugin listening on a local TCP socket.
//!
//! # Architecture
//!
//! ```text
//! AI client ──stdio/JSON-RPC──▶ McpServer ──▶ Bridge ──TCP/JSON──▶ CAD plugin
//! ```
//!
//! - The server owns the MCP lifecycle and knows nothing about tools.
//! - A [`bridge::Bridge`] validates arguments and shapes plugin commands.
//! - The [`plugin`] layer keeps one persistent socket per process and
//!   reassembles responses that arrive in pieces.
//!
//! # Modules
//!
//! - [`bridge`]: Rhino and Grasshopper tool sets
//! - [`cli`]: Shared entry point for the two binaries
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Configuration error types
//! - [`mcp`]: MCP protocol implementation
//! - [`plugin`]: Plugin socket client

pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod plugin;
