//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod offline;
mod serve;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{load_config, GmcpConfig};

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// gmcp - Gemini-backed MCP servers for PDFs and images
#[derive(Parser)]
#[command(name = "gmcp")]
#[command(about = "Gemini-backed MCP tool servers for PDF and image understanding")]
#[command(version)]
pub struct Cli {
    /// Path to gmcp.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the `gemini-pdf` MCP server on stdio
    Pdf,

    /// Run the `img-understanding-mcp` MCP server on stdio
    Image,

    /// Render masks and overlays from a saved segmentation response
    Segment {
        /// Source image the response refers to
        image: PathBuf,

        /// File holding the model's response text (fenced or bare JSON)
        response: PathBuf,

        /// Output directory (default: [segment].output_dir from config)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the result as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Map the boxes of a saved detection response to pixel coordinates
    Detect {
        /// Source image the response refers to
        image: PathBuf,

        /// File holding the model's response text
        response: PathBuf,
    },
}

/// Load configuration, reporting problems on stderr.
fn config_or_exit(path: Option<&std::path::Path>) -> Result<GmcpConfig, ExitCode> {
    load_config(path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Parse arguments and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_or_exit(cli.config.as_deref()) {
        Ok(config) => config,
        Err(code) => return code,
    };

    match cli.command {
        Commands::Pdf => serve::run_serve(serve::ServerKind::Pdf, &config),
        Commands::Image => serve::run_serve(serve::ServerKind::Image, &config),
        Commands::Segment { image, response, out, json } => {
            let out = out.unwrap_or_else(|| config.segment.output_dir.clone());
            offline::run_segment(&image, &response, &out, json)
        }
        Commands::Detect { image, response } => offline::run_detect(&image, &response),
    }
}
