//! rhino-mcp: MCP bridge server for the Rhino plugin.

use std::process::ExitCode;

use rhino_grasshopper_mcp::bridge::BridgeKind;

fn main() -> ExitCode {
    rhino_grasshopper_mcp::cli::run(BridgeKind::Rhino)
}
