//! Effective configuration domain types.
//!
//! These are the typed view of the merged `defaults` + profile + CLI
//! override document. Providers are closed enums: an unknown value is a
//! deserialization error, never a runtime fallback.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Default listen port for the traffic-inspecting proxy.
pub const DEFAULT_PROXY_PORT: u16 = 8002;

/// Default listen port for the tracing sink.
pub const DEFAULT_TRACING_PORT: u16 = 7000;

const LOOPBACK: &str = "127.0.0.1";

/// Supported agent runtimes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentProvider {
    #[default]
    Pydanticai,
    CrewAi,
    Langchain,
}

/// Supported model backends.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelProvider {
    #[default]
    Openai,
    Anthropic,
    AzureOpenai,
    Gemini,
}

/// Supported proxy flavors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProxyKind {
    #[default]
    Mitmproxy,
    None,
}

/// Traffic-inspecting proxy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub kind: ProxyKind,
    pub listen_host: String,
    pub listen_port: u16,
    /// Addon script passed to the built-in mitmdump command line.
    pub script: String,
    /// Full argv override. When set, it replaces the built-in command line
    /// verbatim and the caller owns every flag.
    pub cmd: Option<Vec<String>>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: ProxyKind::default(),
            listen_host: LOOPBACK.to_string(),
            listen_port: DEFAULT_PROXY_PORT,
            script: "src/proxy/reverse_logger.py".to_string(),
            cmd: None,
        }
    }
}

impl ProxyConfig {
    /// True when a proxy process should actually be launched.
    #[must_use]
    pub fn active(&self) -> bool {
        self.enabled && self.kind != ProxyKind::None
    }
}

/// Tracing sink settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub host: String,
    pub port: u16,
    /// Full argv override, replacing the built-in uvicorn command line.
    pub cmd: Option<Vec<String>>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            host: LOOPBACK.to_string(),
            port: DEFAULT_TRACING_PORT,
            cmd: None,
        }
    }
}

/// The one effective configuration for a single `up` invocation.
///
/// Built once at startup and never mutated after variant resolution.
/// The MCP variants stay opaque string keys until resolved against the
/// lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveConfig {
    #[serde(default)]
    pub agent_provider: AgentProvider,
    #[serde(default)]
    pub model_provider: ModelProvider,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub tracing_api: TracingConfig,
    #[serde(default = "default_variant")]
    pub mcp_server_variant: String,
    #[serde(default = "default_variant")]
    pub mcp_client_variant: String,
}

fn default_variant() -> String {
    "stdio".to_string()
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            agent_provider: AgentProvider::default(),
            model_provider: ModelProvider::default(),
            proxy: ProxyConfig::default(),
            tracing_api: TracingConfig::default(),
            mcp_server_variant: default_variant(),
            mcp_client_variant: default_variant(),
        }
    }
}
