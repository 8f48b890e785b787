//! CLI dispatch for the `gmcp pdf` and `gmcp image` server commands.

use std::process::ExitCode;

use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use crate::config::GmcpConfig;
use crate::mcp::{run_image_server, run_pdf_server, ToolContext};

use super::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    Pdf,
    Image,
}

/// Log to stderr; stdout carries the MCP protocol.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Execute a server command.
pub fn run_serve(kind: ServerKind, config: &GmcpConfig) -> ExitCode {
    init_tracing();

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create async runtime: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let ctx = match ToolContext::from_config(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let result = rt.block_on(async {
        match kind {
            ServerKind::Pdf => run_pdf_server(ctx).await,
            ServerKind::Image => run_image_server(ctx).await,
        }
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            tracing::error!(error = %e, "server exited with an error");
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
