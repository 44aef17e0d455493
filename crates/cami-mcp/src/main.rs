//! CAMI MCP Server
//!
//! # Usage
//!
//! ```bash
//! cami-mcp [--workspace <path>]
//! ```
//!
//! # Environment Variables
//!
//! - `CAMI_WORKSPACE`: Workspace root (default: `~/cami-workspace`)
//! - `RUST_LOG`: Control log verbosity (default: `cami_mcp=info`)
//!
//! Responses go to stdout; logs go to stderr.

use std::path::PathBuf;

use cami_core::Workspace;
use cami_mcp::CamiMcpServer;
use clap::Parser;

/// MCP server for CAMI agent management
#[derive(Parser)]
#[command(name = "cami-mcp")]
#[command(about = "MCP server for CAMI agent management")]
#[command(version)]
struct Args {
    /// Workspace root
    #[arg(short, long, env = "CAMI_WORKSPACE")]
    workspace: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cami_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let workspace = Workspace::resolve(args.workspace.as_deref())?;

    tracing::info!(workspace = %workspace.root().display(), "Starting cami-mcp server");

    let mut server = CamiMcpServer::new(workspace);
    server.run().await?;

    Ok(())
}
