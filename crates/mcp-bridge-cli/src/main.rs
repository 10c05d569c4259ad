//! mcp-bridge — lets a STDIO MCP client drive an HTTP tool server.

use anyhow::{Context, Result};
use clap::Parser;
use mcp_bridge_config::{BridgeConfig, CliOverrides};
use mcp_bridge_core::{Bridge, Dispatcher, HttpToolServer};
use std::io;

#[derive(Parser)]
#[command(
    name = "mcp-bridge",
    version,
    about = "Bridge a STDIO MCP client to an HTTP tool server"
)]
struct Cli {
    /// Tool server host (overrides MCP_BRIDGE_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Tool server port (overrides MCP_BRIDGE_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Per-request timeout in milliseconds (overrides MCP_BRIDGE_TIMEOUT_MS)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Check that the tool server is reachable, then exit
    #[arg(long)]
    check: bool,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries protocol messages only.
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_ansi(false)
            .init();
    }

    let config = BridgeConfig::load(CliOverrides {
        host: cli.host,
        port: cli.port,
        timeout_ms: cli.timeout_ms,
    })
    .context("Failed to load configuration")?;

    tracing::debug!("Tool server at {}", config.base_url());

    let server = HttpToolServer::new(&config).context("Failed to create HTTP client")?;
    let bridge = Bridge::new(Dispatcher::new(server, config.screenshot_tools.clone()));

    if cli.check {
        let status = bridge.connect().map_err(|e| {
            tracing::error!("{e} (at {})", config.base_url());
            e
        })?;
        eprintln!("OK: {} at {}", status.describe(), config.base_url());
        return Ok(());
    }

    bridge
        .run(io::stdin().lock(), io::stdout().lock())
        .map_err(|e| {
            tracing::error!("{e} (at {})", config.base_url());
            e
        })?;

    Ok(())
}
