//! Config resolver: defaults + optional profile + CLI overrides.
//!
//! Merging happens on the untyped YAML tree so profile fragments can be
//! arbitrarily partial; the merged result is then validated against the
//! typed schema. The `lookups` section is validated independently and is
//! never subject to profile merging.

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::config::{AgentProvider, EffectiveConfig, ModelProvider};
use crate::error::ConfigError;
use crate::lookups::LookupTable;
use crate::merge::deep_merge;

/// One-shot CLI overrides, already parsed into the closed provider enums.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub agent: Option<AgentProvider>,
    pub model: Option<ModelProvider>,
    pub server_variant: Option<String>,
    pub client_variant: Option<String>,
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// Resolve the raw configuration document into the effective configuration
/// and the lookup table.
///
/// A requested profile that does not exist fails immediately, with no
/// partial application. Overrides land in the merged tree before schema
/// validation, so the validated config is the config that runs.
pub fn resolve_config(
    raw: &str,
    profile: Option<&str>,
    overrides: &Overrides,
) -> Result<(EffectiveConfig, LookupTable), ConfigError> {
    let doc: Value = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
    let Value::Mapping(doc) = doc else {
        return Err(ConfigError::NotAMapping);
    };

    let mut cfg = doc
        .get(&key("defaults"))
        .cloned()
        .unwrap_or_else(|| Value::Mapping(Mapping::new()));
    if !cfg.is_mapping() {
        return Err(ConfigError::InvalidConfig(
            "'defaults' must be a mapping".to_string(),
        ));
    }

    if let Some(name) = profile {
        let prof = doc
            .get(&key("profiles"))
            .and_then(|profiles| profiles.get(name))
            .cloned()
            // A null-bodied profile entry is indistinguishable from an
            // absent one.
            .filter(|prof| !prof.is_null())
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))?;
        if !prof.is_mapping() {
            return Err(ConfigError::InvalidConfig(format!(
                "profile '{name}' must be a mapping"
            )));
        }
        debug!(profile = name, "Applying profile overrides");
        deep_merge(&mut cfg, &prof);
    }

    if let Some(map) = cfg.as_mapping_mut() {
        flatten_mcp_shorthand(map);
        apply_overrides(map, overrides);
    }

    let lookups_raw = doc
        .get(&key("lookups"))
        .cloned()
        .unwrap_or_else(|| Value::Mapping(Mapping::new()));
    // Deserialize through a path-tracking adapter so a schema error names
    // the offending field path, not just the field.
    let lookups: LookupTable = serde_path_to_error::deserialize(lookups_raw)
        .map_err(|e| ConfigError::InvalidLookups(e.to_string()))?;

    let cfg: EffectiveConfig = serde_path_to_error::deserialize(cfg)
        .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;

    Ok((cfg, lookups))
}

/// Flatten nested `mcp.server_variant` / `mcp.client_variant` shorthand
/// into the top-level selection fields before schema validation.
fn flatten_mcp_shorthand(cfg: &mut Mapping) {
    let Some(Value::Mapping(nested)) = cfg.remove(&key("mcp")) else {
        return;
    };
    if let Some(variant) = nested.get(&key("server_variant")) {
        cfg.insert(key("mcp_server_variant"), variant.clone());
    }
    if let Some(variant) = nested.get(&key("client_variant")) {
        cfg.insert(key("mcp_client_variant"), variant.clone());
    }
}

fn apply_overrides(cfg: &mut Mapping, overrides: &Overrides) {
    if let Some(agent) = overrides.agent {
        cfg.insert(key("agent_provider"), Value::String(agent.to_string()));
    }
    if let Some(model) = overrides.model {
        cfg.insert(key("model_provider"), Value::String(model.to_string()));
    }
    if let Some(variant) = &overrides.server_variant {
        cfg.insert(key("mcp_server_variant"), Value::String(variant.clone()));
    }
    if let Some(variant) = &overrides.client_variant {
        cfg.insert(key("mcp_client_variant"), Value::String(variant.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyKind;

    const DOC: &str = r#"
defaults:
  agent_provider: pydanticai
  model_provider: openai
  proxy:
    enabled: true
    listen_port: 8002
  tracing_api:
    port: 7000
  mcp_server_variant: stdio
  mcp_client_variant: stdio

profiles:
  no_proxy:
    proxy:
      enabled: false
  http_crew:
    agent_provider: crew_ai
    mcp:
      server_variant: http
      client_variant: http

lookups:
  model_reverse_target:
    openai: https://api.openai.com
    anthropic: https://api.anthropic.com
  mcp:
    pydanticai:
      servers:
        stdio: {type: stdio}
      clients:
        stdio: {type: stdio, cmd: ["echo", "client"]}
"#;

    #[test]
    fn defaults_only() {
        let (cfg, lookups) = resolve_config(DOC, None, &Overrides::default()).unwrap();
        assert_eq!(cfg.agent_provider, AgentProvider::Pydanticai);
        assert!(cfg.proxy.enabled);
        assert_eq!(cfg.proxy.listen_port, 8002);
        assert_eq!(
            lookups.model_reverse_target["openai"],
            "https://api.openai.com"
        );
    }

    #[test]
    fn profile_merge_is_partial() {
        let (cfg, _) = resolve_config(DOC, Some("no_proxy"), &Overrides::default()).unwrap();
        assert!(!cfg.proxy.enabled);
        // Untouched sibling keys survive the merge.
        assert_eq!(cfg.proxy.listen_port, 8002);
        assert_eq!(cfg.proxy.kind, ProxyKind::Mitmproxy);
    }

    #[test]
    fn missing_profile_fails() {
        let err = resolve_config(DOC, Some("staging"), &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound(name) if name == "staging"));
    }

    #[test]
    fn nested_mcp_shorthand_is_flattened() {
        let (cfg, _) = resolve_config(DOC, Some("http_crew"), &Overrides::default()).unwrap();
        assert_eq!(cfg.agent_provider, AgentProvider::CrewAi);
        assert_eq!(cfg.mcp_server_variant, "http");
        assert_eq!(cfg.mcp_client_variant, "http");
    }

    #[test]
    fn cli_overrides_win_over_profile() {
        let overrides = Overrides {
            agent: Some(AgentProvider::Langchain),
            model: Some(ModelProvider::Anthropic),
            server_variant: Some("http".to_string()),
            client_variant: None,
        };
        let (cfg, _) = resolve_config(DOC, Some("http_crew"), &overrides).unwrap();
        assert_eq!(cfg.agent_provider, AgentProvider::Langchain);
        assert_eq!(cfg.model_provider, ModelProvider::Anthropic);
        assert_eq!(cfg.mcp_server_variant, "http");
        // Not overridden: profile value stands.
        assert_eq!(cfg.mcp_client_variant, "http");
    }

    #[test]
    fn invalid_lookups_reports_field_path() {
        // Only crew_ai's stdio client is malformed; the diagnostic must
        // point at it, not just name the missing field.
        let doc = r#"
defaults: {}
lookups:
  model_reverse_target:
    openai: https://api.openai.com
  mcp:
    pydanticai:
      clients:
        stdio: {type: stdio, cmd: ["echo"]}
    crew_ai:
      clients:
        stdio: {type: stdio}
"#;
        let err = resolve_config(doc, None, &Overrides::default()).unwrap_err();
        match err {
            ConfigError::InvalidLookups(msg) => {
                assert!(msg.contains("cmd"), "missing field name in: {msg}");
                assert!(msg.contains("crew_ai"), "missing agent path in: {msg}");
                assert!(msg.contains("stdio"), "missing variant path in: {msg}");
            }
            other => panic!("expected InvalidLookups, got {other:?}"),
        }
    }

    #[test]
    fn null_bodied_profile_is_treated_as_missing() {
        let doc = "defaults: {}\nprofiles:\n  staging:\n";
        let err = resolve_config(doc, Some("staging"), &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound(name) if name == "staging"));
    }

    #[test]
    fn scalar_profile_body_is_rejected() {
        let doc = "defaults: {}\nprofiles:\n  staging: fast\n";
        let err = resolve_config(doc, Some("staging"), &Overrides::default()).unwrap_err();
        match err {
            ConfigError::InvalidConfig(msg) => assert!(msg.contains("staging")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn unknown_provider_in_document_fails_validation() {
        let doc = "defaults:\n  agent_provider: autogen\n";
        let err = resolve_config(doc, None, &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        assert!(matches!(
            resolve_config("- 1\n- 2\n", None, &Overrides::default()),
            Err(ConfigError::NotAMapping)
        ));
    }

    #[test]
    fn missing_lookups_section_defaults_to_empty() {
        let (_, lookups) = resolve_config("defaults: {}\n", None, &Overrides::default()).unwrap();
        assert!(lookups.model_reverse_target.is_empty());
        assert!(lookups.mcp.is_empty());
    }
}
