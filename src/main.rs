//! gmcp - Gemini-backed MCP servers and offline segmentation tools

use std::process::ExitCode;

use gemini_mcp::cli;

fn main() -> ExitCode {
    cli::run()
}
