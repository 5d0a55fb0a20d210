//! Subcommand definitions.

use clap::Subcommand;
use std::str::FromStr;

use devstack_core::{AgentProvider, ModelProvider};

/// Available devstack commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Boot the pipeline and block on the foreground client
    Up {
        /// Profile name from the config file
        #[arg(long)]
        profile: Option<String>,

        /// Path to the config file
        #[arg(long, default_value = "devstack.yaml")]
        config_path: String,

        /// Path to a .env file with secrets
        #[arg(long, default_value = ".env")]
        env_file: String,

        /// Override the agent provider (pydanticai|crew_ai|langchain)
        #[arg(long, value_parser = parse_agent)]
        agent: Option<AgentProvider>,

        /// Override the model provider (openai|anthropic|azure_openai|gemini)
        #[arg(long, value_parser = parse_model)]
        model: Option<ModelProvider>,

        /// Override the MCP server variant (e.g. stdio|http)
        #[arg(long)]
        mcp_server_variant: Option<String>,

        /// Override the MCP client variant (e.g. stdio|http)
        #[arg(long)]
        mcp_client_variant: Option<String>,
    },
}

fn parse_agent(raw: &str) -> Result<AgentProvider, String> {
    AgentProvider::from_str(raw).map_err(|_| {
        format!("unsupported agent provider '{raw}' (expected pydanticai, crew_ai, or langchain)")
    })
}

fn parse_model(raw: &str) -> Result<ModelProvider, String> {
    ModelProvider::from_str(raw).map_err(|_| {
        format!(
            "unsupported model provider '{raw}' (expected openai, anthropic, azure_openai, or gemini)"
        )
    })
}

#[cfg(test)]
mod tests {
    use crate::parser::Cli;
    use clap::Parser;

    use super::*;

    #[test]
    fn up_parses_with_defaults() {
        let cli = Cli::try_parse_from(["devstack", "up"]).unwrap();
        let Some(Commands::Up {
            profile,
            config_path,
            env_file,
            agent,
            ..
        }) = cli.command
        else {
            panic!("expected up command");
        };
        assert!(profile.is_none());
        assert_eq!(config_path, "devstack.yaml");
        assert_eq!(env_file, ".env");
        assert!(agent.is_none());
    }

    #[test]
    fn up_accepts_provider_overrides() {
        let cli = Cli::try_parse_from([
            "devstack",
            "up",
            "--profile",
            "no_proxy",
            "--agent",
            "crew_ai",
            "--model",
            "anthropic",
            "--mcp-server-variant",
            "http",
        ])
        .unwrap();
        let Some(Commands::Up {
            profile,
            agent,
            model,
            mcp_server_variant,
            ..
        }) = cli.command
        else {
            panic!("expected up command");
        };
        assert_eq!(profile.as_deref(), Some("no_proxy"));
        assert_eq!(agent, Some(AgentProvider::CrewAi));
        assert_eq!(model, Some(ModelProvider::Anthropic));
        assert_eq!(mcp_server_variant.as_deref(), Some("http"));
    }

    #[test]
    fn unknown_provider_is_a_usage_error() {
        assert!(Cli::try_parse_from(["devstack", "up", "--agent", "autogen"]).is_err());
    }
}
