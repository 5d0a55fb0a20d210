//! Top-level argument parser.

use clap::Parser;

use crate::commands::Commands;

/// Local development pipeline orchestrator: boots a tracing sink, an
/// optional traffic-inspecting proxy, an MCP tool server, and a foreground
/// client, wired together through environment variables.
#[derive(Parser)]
#[command(name = "devstack", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}
