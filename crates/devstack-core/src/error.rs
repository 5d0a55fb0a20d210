//! Error types for configuration and variant resolution.
//!
//! Both categories are fatal and always reported before any process is
//! spawned. Display strings are single-line diagnostics.

use crate::config::{AgentProvider, ModelProvider};
use crate::lookups::Transport;
use thiserror::Error;

/// Errors raised while loading and validating the configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid YAML.
    #[error("Failed to parse config document: {0}")]
    Parse(String),

    /// The document root is not a mapping.
    #[error("Config document must be a mapping with 'defaults'/'profiles'/'lookups' keys")]
    NotAMapping,

    /// A named profile was requested but does not exist.
    #[error("Profile '{0}' not found in config")]
    ProfileNotFound(String),

    /// The `lookups` section failed schema validation.
    #[error("Invalid 'lookups' config: {0}")]
    InvalidLookups(String),

    /// The merged `defaults`/profile document failed schema validation.
    #[error("Invalid 'defaults/profiles' config: {0}")]
    InvalidConfig(String),
}

/// Errors raised while resolving variants against the lookup table.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The selected model provider has no reverse-proxy target entry.
    #[error(
        "No reverse target defined for model_provider '{provider}' in lookups.model_reverse_target"
    )]
    MissingReverseTarget { provider: ModelProvider },

    /// The reverse target carries a path, query, or fragment. It is used as
    /// a reverse-proxy base, so anything beyond scheme+host would be
    /// silently dropped.
    #[error(
        "Proxy reverse target must be a base host (e.g. https://api.openai.com), not a path: '{target}'"
    )]
    ReverseTargetNotHostOnly { target: String },

    /// The selected agent provider has no MCP lookup entry.
    #[error("No MCP lookups for agent '{agent}' in lookups.mcp")]
    UnknownAgent { agent: AgentProvider },

    /// The chosen server variant is not defined for the agent.
    #[error("No MCP server variant '{variant}' for agent '{agent}'")]
    UnknownServerVariant {
        agent: AgentProvider,
        variant: String,
    },

    /// The chosen client variant is not defined for the agent.
    #[error("No MCP client variant '{variant}' for agent '{agent}'")]
    UnknownClientVariant {
        agent: AgentProvider,
        variant: String,
    },

    /// Server and client speak different transports. Never auto-reconciled:
    /// a stdio client cannot speak to an http server.
    #[error(
        "MCP server/client transport mismatch: server='{server}' vs client='{client}'. Pick matching variants."
    )]
    TransportMismatch { server: Transport, client: Transport },

    /// An http server definition is missing its advertised URL.
    #[error("HTTP MCP server requires a 'url' field in lookups.mcp.{agent}.servers.{variant}")]
    MissingServerUrl {
        agent: AgentProvider,
        variant: String,
    },
}
