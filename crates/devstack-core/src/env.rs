//! Environment projection for downstream processes.
//!
//! Pure function of the base environment, the effective configuration, and
//! the resolved run. Keys describing the orchestrator's own decisions are
//! authoritative and overwrite anything inherited; `BASE_URL` is a soft
//! default that an operator-set value always wins over.

use std::collections::BTreeMap;

use crate::config::EffectiveConfig;
use crate::lookups::Transport;
use crate::resolve::ResolvedRun;

/// Flat environment map handed to every spawned process.
pub type Environment = BTreeMap<String, String>;

/// Project the resolved configuration into environment variables.
#[must_use]
pub fn build_env(base: &Environment, cfg: &EffectiveConfig, run: &ResolvedRun) -> Environment {
    let mut env = base.clone();

    env.insert(
        "AGENT_PROVIDER".to_string(),
        cfg.agent_provider.to_string(),
    );
    env.insert(
        "MODEL_PROVIDER".to_string(),
        cfg.model_provider.to_string(),
    );
    env.insert(
        "TRACING_API".to_string(),
        format!("http://{}:{}", cfg.tracing_api.host, cfg.tracing_api.port),
    );

    // Soft default: never clobber a BASE_URL the operator already exported.
    if cfg.proxy.active() {
        let proxy_url = format!("http://{}:{}", cfg.proxy.listen_host, cfg.proxy.listen_port);
        env.entry("BASE_URL".to_string()).or_insert(proxy_url);
    }

    env.insert(
        "MCP_AGENT_PROVIDER".to_string(),
        cfg.agent_provider.to_string(),
    );
    env.insert(
        "MCP_SERVER_VARIANT".to_string(),
        cfg.mcp_server_variant.clone(),
    );
    env.insert(
        "MCP_CLIENT_VARIANT".to_string(),
        cfg.mcp_client_variant.clone(),
    );
    env.insert("MCP_TRANSPORT".to_string(), run.transport.to_string());

    if let Some(path) = &run.client.client_path {
        env.insert("MCP_CLIENT_CONFIG".to_string(), path.clone());
    }
    if run.transport == Transport::Http
        && let Some(url) = &run.server.url
    {
        env.insert("MCP_SERVER_URL".to_string(), url.clone());
    }

    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProxyConfig, ProxyKind};
    use crate::lookups::{ClientDef, ServerDef};

    fn run(transport: Transport, url: Option<&str>, client_path: Option<&str>) -> ResolvedRun {
        ResolvedRun {
            server: ServerDef {
                transport,
                cmd: None,
                url: url.map(str::to_string),
            },
            client: ClientDef {
                transport,
                cmd: vec!["echo".to_string()],
                args: vec![],
                client_path: client_path.map(str::to_string),
            },
            transport,
            reverse_target: Some("https://api.openai.com".to_string()),
        }
    }

    #[test]
    fn identity_and_tracing_keys_are_always_set() {
        let cfg = EffectiveConfig::default();
        let env = build_env(&Environment::new(), &cfg, &run(Transport::Stdio, None, None));
        assert_eq!(env["AGENT_PROVIDER"], "pydanticai");
        assert_eq!(env["MODEL_PROVIDER"], "openai");
        assert_eq!(env["TRACING_API"], "http://127.0.0.1:7000");
        assert_eq!(env["MCP_TRANSPORT"], "stdio");
        assert_eq!(env["MCP_SERVER_VARIANT"], "stdio");
        assert!(!env.contains_key("MCP_SERVER_URL"));
        assert!(!env.contains_key("MCP_CLIENT_CONFIG"));
    }

    #[test]
    fn base_url_is_a_soft_default() {
        let cfg = EffectiveConfig::default();
        let env = build_env(&Environment::new(), &cfg, &run(Transport::Stdio, None, None));
        assert_eq!(env["BASE_URL"], "http://127.0.0.1:8002");

        let mut base = Environment::new();
        base.insert("BASE_URL".to_string(), "http://elsewhere:9".to_string());
        let env = build_env(&base, &cfg, &run(Transport::Stdio, None, None));
        assert_eq!(env["BASE_URL"], "http://elsewhere:9");
    }

    #[test]
    fn no_base_url_when_proxy_is_off() {
        let cfg = EffectiveConfig {
            proxy: ProxyConfig {
                enabled: false,
                ..ProxyConfig::default()
            },
            ..EffectiveConfig::default()
        };
        let env = build_env(&Environment::new(), &cfg, &run(Transport::Stdio, None, None));
        assert!(!env.contains_key("BASE_URL"));

        let cfg = EffectiveConfig {
            proxy: ProxyConfig {
                kind: ProxyKind::None,
                ..ProxyConfig::default()
            },
            ..EffectiveConfig::default()
        };
        let env = build_env(&Environment::new(), &cfg, &run(Transport::Stdio, None, None));
        assert!(!env.contains_key("BASE_URL"));
    }

    #[test]
    fn derived_keys_overwrite_inherited_values() {
        let mut base = Environment::new();
        base.insert("MCP_TRANSPORT".to_string(), "http".to_string());
        base.insert("AGENT_PROVIDER".to_string(), "stale".to_string());
        let cfg = EffectiveConfig::default();
        let env = build_env(&base, &cfg, &run(Transport::Stdio, None, None));
        assert_eq!(env["MCP_TRANSPORT"], "stdio");
        assert_eq!(env["AGENT_PROVIDER"], "pydanticai");
    }

    #[test]
    fn http_transport_exports_server_url_and_client_config() {
        let cfg = EffectiveConfig::default();
        let env = build_env(
            &Environment::new(),
            &cfg,
            &run(
                Transport::Http,
                Some("http://127.0.0.1:8833/mcp"),
                Some("clients/http.json"),
            ),
        );
        assert_eq!(env["MCP_SERVER_URL"], "http://127.0.0.1:8833/mcp");
        assert_eq!(env["MCP_CLIENT_CONFIG"], "clients/http.json");
        assert_eq!(env["MCP_TRANSPORT"], "http");
    }

    #[test]
    fn unrelated_base_keys_pass_through() {
        let mut base = Environment::new();
        base.insert("OPENAI_API_KEY".to_string(), "sk-test".to_string());
        let cfg = EffectiveConfig::default();
        let env = build_env(&base, &cfg, &run(Transport::Stdio, None, None));
        assert_eq!(env["OPENAI_API_KEY"], "sk-test");
    }
}
