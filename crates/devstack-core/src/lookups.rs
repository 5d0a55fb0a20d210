//! The lookup table: reverse-proxy targets per model provider, and MCP
//! server/client variant definitions per agent provider.
//!
//! Validated against its own schema, independently of profile merging.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

/// MCP transport kind. Closed set: an unrecognized transport in the
/// document is a deserialization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Transport {
    Stdio,
    Http,
}

/// One MCP server variant definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDef {
    #[serde(rename = "type")]
    pub transport: Transport,
    /// Launch argv. Optional: an http server may already be running
    /// externally, and a stdio variant may be client-spawned.
    #[serde(default)]
    pub cmd: Option<Vec<String>>,
    /// Advertised URL, required for http transport.
    #[serde(default)]
    pub url: Option<String>,
}

/// One MCP client variant definition, including the foreground launch spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDef {
    #[serde(rename = "type")]
    pub transport: Transport,
    pub cmd: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
    /// Client-side MCP config file, exported as `MCP_CLIENT_CONFIG`.
    #[serde(default)]
    pub client_path: Option<String>,
}

/// Server and client variants for one agent provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentLookups {
    #[serde(default)]
    pub servers: HashMap<String, ServerDef>,
    #[serde(default)]
    pub clients: HashMap<String, ClientDef>,
}

/// The `lookups` section of the configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupTable {
    /// Model-provider identifier -> reverse-proxy target (scheme+host only).
    pub model_reverse_target: HashMap<String, String>,
    /// Agent-provider identifier -> variant definitions.
    pub mcp: HashMap<String, AgentLookups>,
}
