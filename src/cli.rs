//! Command-line entry point shared by the `rhino-mcp` and `grasshopper-mcp`
//! binaries.
//!
//! Start-up order: parse arguments, load the config file, apply environment
//! overrides, apply CLI overrides, validate, initialise logging, then serve
//! MCP on stdio until the client goes away or a signal arrives.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use crate::bridge::BridgeKind;
use crate::config::{self, Config};
use crate::error::ConfigError;
use crate::mcp::server::McpServer;
use crate::plugin::ConnectionManager;

/// MCP bridge server for a Rhino or Grasshopper plugin.
///
/// Speaks MCP on stdin/stdout and forwards tool calls to the plugin's TCP
/// socket. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    pub quiet: bool,

    /// Plugin host (overrides config and environment)
    #[arg(long)]
    pub host: Option<String>,

    /// Plugin port (overrides config and environment)
    #[arg(long)]
    pub port: Option<u16>,

    /// Plugin response timeout in seconds (overrides config and environment)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,
}

impl Args {
    /// Applies the plugin overrides given on the command line.
    pub fn apply_to(&self, config: &mut Config, kind: BridgeKind) {
        let plugin = config.plugin_mut(kind);
        if let Some(host) = &self.host {
            plugin.host.clone_from(host);
        }
        if let Some(port) = self.port {
            plugin.port = Some(port);
        }
        if let Some(timeout) = self.timeout {
            plugin.timeout_secs = timeout;
        }
    }
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
#[must_use]
pub fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" | "warning" => Level::WARN,
            "error" | "critical" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Everything goes to stderr; stdout carries MCP messages only.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the effective configuration for `kind`.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded, an environment override
/// does not parse, or the merged result fails validation.
pub fn resolve_config<F>(args: &Args, kind: BridgeKind, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = config::load_config(args.config.as_deref())?;
    cfg.apply_env(kind, env)?;
    args.apply_to(&mut cfg, kind);
    cfg.validate()?;
    Ok(cfg)
}

/// Runs the bridge server for `kind`. Called from `main`.
#[must_use]
pub fn run(kind: BridgeKind) -> ExitCode {
    let args = Args::parse();
    let name = kind.server_name();

    let cfg = match resolve_config(&args, kind, |key| std::env::var(key).ok()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if args.config.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nConfig file location: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    eprintln!("{name} {}", env!("CARGO_PKG_VERSION"));
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!();

    let settings = cfg.connection_settings(kind);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        plugin = settings.plugin,
        host = %settings.host,
        port = settings.port,
        timeout_secs = settings.timeout.as_secs_f64(),
        "Starting {name} server"
    );

    let manager = Arc::new(ConnectionManager::new(settings));
    let mut server = McpServer::stdio(kind.bridge(), Arc::clone(&manager));

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(server.run());

    // The server already disconnects; this covers a run that never started.
    manager.cleanup();

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
