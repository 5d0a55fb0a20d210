//! Supervisor error types.

use crate::types::Stage;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Fatal failures during staged startup. Every one of these funnels
/// through the shutdown coordinator before the orchestrator exits.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A spawned process's listen port never became reachable.
    #[error("{stage} failed to open {host}:{port} within {deadline:?}")]
    ReadinessTimeout {
        stage: Stage,
        host: String,
        port: u16,
        deadline: Duration,
    },

    /// The OS refused to spawn or wait on a process.
    #[error("Failed to spawn {stage} process: {reason}")]
    SpawnFailed { stage: Stage, reason: String },

    /// A supervised process died before becoming ready.
    #[error("{stage} process exited early ({status})")]
    EarlyExit { stage: Stage, status: ExitStatus },

    /// A stage was asked to launch with an empty argv.
    #[error("No command configured for {stage}")]
    EmptyCommand { stage: Stage },

    /// Re-check of the reverse target at spawn time failed.
    #[error(
        "Proxy reverse target must be a base host (e.g. https://api.openai.com), not a path: '{0}'"
    )]
    InvalidReverseTarget(String),

    /// The advertised MCP server URL has no usable host:port.
    #[error("Invalid MCP HTTP server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
}
