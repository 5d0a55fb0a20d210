//! CLI entry point - the composition root.
//!
//! Exit codes: 0 on clean client completion (or the client's own code),
//! 1 on any configuration/resolution/readiness failure, 130 on SIGINT.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use devstack_cli::handlers::up::{self, UpArgs};
use devstack_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        // No command provided - show help
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    let code = match command {
        Commands::Up {
            profile,
            config_path,
            env_file,
            agent,
            model,
            mcp_server_variant,
            mcp_client_variant,
        } => {
            let args = UpArgs {
                profile,
                config_path,
                env_file,
                agent,
                model,
                mcp_server_variant,
                mcp_client_variant,
            };
            match up::execute(args).await {
                Ok(code) => code,
                Err(e) => {
                    // Single-line diagnostic, then a non-zero exit.
                    eprintln!("{e:#}");
                    1
                }
            }
        }
    };

    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}
