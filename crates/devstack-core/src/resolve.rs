//! Variant lookup resolution.
//!
//! Turns the effective configuration plus the lookup table into the
//! concrete server/client definitions and reverse-proxy target for one
//! run. Produced once per invocation and immutable thereafter.

use tracing::debug;
use url::Url;

use crate::config::EffectiveConfig;
use crate::error::ResolutionError;
use crate::lookups::{ClientDef, LookupTable, ServerDef, Transport};

/// Everything the process supervisor needs, resolved and validated.
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub server: ServerDef,
    pub client: ClientDef,
    pub transport: Transport,
    /// Present whenever the model provider has a reverse-target entry;
    /// validated host-only only when the proxy will actually run.
    pub reverse_target: Option<String>,
}

/// True if `raw` parses as a URL that is scheme+host only: path empty or
/// `/`, no query, no fragment.
#[must_use]
pub fn is_host_only_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => {
            url.has_host()
                && (url.path().is_empty() || url.path() == "/")
                && url.query().is_none()
                && url.fragment().is_none()
        }
        Err(_) => false,
    }
}

impl ResolvedRun {
    /// Resolve the selected variants and reverse target.
    ///
    /// All failure cases are fatal and reported before any process spawns.
    pub fn resolve(
        cfg: &EffectiveConfig,
        lookups: &LookupTable,
    ) -> Result<Self, ResolutionError> {
        let reverse_target = lookups
            .model_reverse_target
            .get(&cfg.model_provider.to_string())
            .cloned();

        if cfg.proxy.enabled {
            let target =
                reverse_target
                    .as_deref()
                    .ok_or(ResolutionError::MissingReverseTarget {
                        provider: cfg.model_provider,
                    })?;
            if !is_host_only_url(target) {
                return Err(ResolutionError::ReverseTargetNotHostOnly {
                    target: target.to_string(),
                });
            }
        }

        let agent = cfg.agent_provider;
        let agent_lookups =
            lookups
                .mcp
                .get(&agent.to_string())
                .ok_or(ResolutionError::UnknownAgent { agent })?;

        let server = agent_lookups
            .servers
            .get(&cfg.mcp_server_variant)
            .cloned()
            .ok_or_else(|| ResolutionError::UnknownServerVariant {
                agent,
                variant: cfg.mcp_server_variant.clone(),
            })?;
        let client = agent_lookups
            .clients
            .get(&cfg.mcp_client_variant)
            .cloned()
            .ok_or_else(|| ResolutionError::UnknownClientVariant {
                agent,
                variant: cfg.mcp_client_variant.clone(),
            })?;

        if server.transport != client.transport {
            return Err(ResolutionError::TransportMismatch {
                server: server.transport,
                client: client.transport,
            });
        }

        if server.transport == Transport::Http && server.url.is_none() {
            return Err(ResolutionError::MissingServerUrl {
                agent,
                variant: cfg.mcp_server_variant.clone(),
            });
        }

        debug!(
            agent = %agent,
            transport = %server.transport,
            server_variant = %cfg.mcp_server_variant,
            client_variant = %cfg.mcp_client_variant,
            "Resolved MCP variants"
        );

        let transport = server.transport;
        Ok(Self {
            server,
            client,
            transport,
            reverse_target,
        })
    }
}
