//! statgate: Statista tool gateway
//!
//! Main entry point.
//!
//! Usage:
//!   statgate           - Start server mode (JSON-RPC host)
//!   statgate --cli     - Start interactive CLI mode
//!   statgate --help    - Show help

mod cli;

use std::sync::Arc;

use sg_core::{Config, SessionContexts, ToolManager};
use sg_mcp::{SharedClientRegistry, StatistaService, register_statista_tools};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "info,sg_mcp=debug,hyper=warn,reqwest=warn,rmcp=info";

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Server mode (JSON-RPC host)
    Server,
    /// Interactive CLI mode
    Cli,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let mode = parse_args(std::env::args().skip(1));

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("statgate {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting statgate...");
    tracing::info!(
        mcp_url = %config.statista.mcp_url,
        timeout_secs = config.statista.request_timeout_secs,
        max_retries = config.statista.max_retries,
        "Statista endpoint"
    );

    // The client itself is built lazily on the first tool call
    let registry = Arc::new(SharedClientRegistry::new(config.statista.clone()));
    let service = Arc::new(StatistaService::new(registry));

    let mut tool_manager = ToolManager::new();
    register_statista_tools(&mut tool_manager, service, config.statista.default_max_results);
    tracing::info!("Registered tools: {:?}", tool_manager.tool_names());

    match mode {
        RunMode::Cli => {
            tracing::info!("Running in CLI mode");
            cli::run_cli(tool_manager).await
        }
        RunMode::Server => run_server(config, tool_manager).await,
        _ => Ok(()),
    }
}

/// Parse command line arguments
fn parse_args<I>(args: I) -> RunMode
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for arg in args {
        match arg.as_ref() {
            "--cli" | "-c" => return RunMode::Cli,
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("statgate - Statista tool gateway");
    println!();
    println!("Usage:");
    println!("  statgate           Start server mode (JSON-RPC host)");
    println!("  statgate --cli     Start interactive CLI mode");
    println!("  statgate --help    Show this help message");
    println!("  statgate --version Show version");
    println!();
    println!("Configuration is read from ./statgate.toml when present.");
    println!();
    println!("Environment Variables:");
    println!("  STATISTA_API_KEY           Statista API key (required for tool calls)");
    println!("  STATISTA_MCP_URL           MCP endpoint (default: https://api.statista.ai/v1/mcp)");
    println!("  STATISTA_TIMEOUT_SECS      Per-call timeout (default: 30)");
    println!("  STATISTA_MAX_RETRIES       Retries for timeouts/upstream errors (default: 2)");
    println!("  STATISTA_RETRY_DELAY_SECS  Pause between retries (default: 2)");
    println!("  API_HOST                   Bind address (default: 0.0.0.0)");
    println!("  API_PORT                   HTTP port (default: 8001)");
    println!("  A2A_BEARER_TOKEN           Bearer token for /jsonrpc (optional)");
    println!("  API_PUBLIC_URL             URL advertised in the agent card");
    println!("  API_MAX_SESSIONS           Session context logs kept in memory (default: 1024)");
    println!("  RUST_LOG                   Log filter (default: {})", DEFAULT_LOG_FILTER);
}

/// Run server mode (JSON-RPC host)
async fn run_server(config: Config, tool_manager: ToolManager) -> anyhow::Result<()> {
    let contexts = Arc::new(SessionContexts::with_max_sessions(config.api.max_sessions));
    let state = sg_api::AppState::new(tool_manager, contexts, &config.api);

    tracing::info!("statgate initialized successfully");
    tracing::info!("Press Ctrl+C to exit");

    sg_api::start_server(&config.api, state, shutdown_signal()).await?;
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down..."),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(Vec::<String>::new()), RunMode::Server);
        assert_eq!(parse_args(["--cli"]), RunMode::Cli);
        assert_eq!(parse_args(["-h"]), RunMode::Help);
        assert_eq!(parse_args(["--unknown", "--version"]), RunMode::Version);
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
