//! Configuration resolution for the devstack pipeline.
//!
//! This crate is the pure half of the orchestrator: it turns a YAML
//! configuration document plus CLI overrides into an [`EffectiveConfig`],
//! resolves the selected MCP server/client variants and reverse-proxy
//! target into a [`ResolvedRun`], and projects both into the environment
//! map downstream processes consume. No process or network I/O lives here.

pub mod config;
pub mod env;
pub mod error;
pub mod loader;
pub mod lookups;
pub mod merge;
pub mod resolve;

// Re-export commonly used types for convenience
pub use config::{AgentProvider, EffectiveConfig, ModelProvider, ProxyConfig, ProxyKind, TracingConfig};
pub use env::{Environment, build_env};
pub use error::{ConfigError, ResolutionError};
pub use loader::{Overrides, resolve_config};
pub use lookups::{AgentLookups, ClientDef, LookupTable, ServerDef, Transport};
pub use merge::deep_merge;
pub use resolve::{ResolvedRun, is_host_only_url};
