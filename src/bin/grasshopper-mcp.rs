//! grasshopper-mcp: MCP bridge server for the Grasshopper plugin.

use std::process::ExitCode;

use rhino_grasshopper_mcp::bridge::BridgeKind;

fn main() -> ExitCode {
    rhino_grasshopper_mcp::cli::run(BridgeKind::Grasshopper)
}
