//! The `up` handler: resolve configuration, then hand off to the
//! supervisor and report its exit code.

use anyhow::Context;
use std::path::Path;
use tracing::debug;

use devstack_core::{
    AgentProvider, Environment, ModelProvider, Overrides, ResolvedRun, build_env, resolve_config,
};
use devstack_runtime::Supervisor;

pub struct UpArgs {
    pub profile: Option<String>,
    pub config_path: String,
    pub env_file: String,
    pub agent: Option<AgentProvider>,
    pub model: Option<ModelProvider>,
    pub mcp_server_variant: Option<String>,
    pub mcp_client_variant: Option<String>,
}

/// Run the pipeline. Returns the orchestrator exit code on a supervised
/// run; any error here happens before the first process is spawned.
pub async fn execute(args: UpArgs) -> anyhow::Result<i32> {
    // Secrets never override variables the operator already exported.
    if Path::new(&args.env_file).exists() {
        dotenvy::from_path(&args.env_file)
            .with_context(|| format!("Failed to load secrets file {}", args.env_file))?;
    } else {
        debug!(path = %args.env_file, "No secrets file found, skipping");
    }

    let raw = std::fs::read_to_string(&args.config_path)
        .with_context(|| format!("Failed to read config file {}", args.config_path))?;

    let overrides = Overrides {
        agent: args.agent,
        model: args.model,
        server_variant: args.mcp_server_variant,
        client_variant: args.mcp_client_variant,
    };
    let (cfg, lookups) = resolve_config(&raw, args.profile.as_deref(), &overrides)?;
    let run = ResolvedRun::resolve(&cfg, &lookups)?;

    let base: Environment = std::env::vars().collect();
    let env = build_env(&base, &cfg, &run);

    Ok(Supervisor::new(cfg, run, env).run().await)
}
