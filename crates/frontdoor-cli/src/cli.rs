use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "frontdoor",
    about = "Validate and manage Azure Front Door rules and secrets from YAML",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and validate every resource file; nothing is sent to Azure.
    Validate {
        /// Directory of resource files.
        dir: PathBuf,

        /// Output format.
        #[arg(long, default_value = "text")]
        output: OutputFormat,
    },

    /// Print an acceptance-test configuration.
    Render {
        kind: ResourceKind,

        /// Fixture name, e.g. `basic` or `invalid_cache_duration`.
        fixture: String,

        /// Seed for generated names. Defaults to a time-derived value.
        #[arg(long)]
        random_integer: Option<u64>,

        #[arg(long, env = "ARM_TEST_LOCATION", default_value = "westeurope")]
        location: String,
    },

    /// Create or update every resource in the directory.
    Apply {
        dir: PathBuf,

        #[command(flatten)]
        azure: AzureArgs,
    },

    /// Delete every resource in the directory.
    Destroy {
        dir: PathBuf,

        #[command(flatten)]
        azure: AzureArgs,
    },

    /// Check whether a resource exists.
    Exists {
        kind: ResourceKind,

        /// Full ARM resource id.
        id: String,

        #[command(flatten)]
        azure: AzureArgs,
    },
}

#[derive(Debug, Args)]
pub struct AzureArgs {
    /// Bearer token for Azure Resource Manager.
    #[arg(long, env = "AZURE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    #[arg(long, env = "FRONTDOOR_MANAGEMENT_URL", default_value = frontdoor_config::settings::DEFAULT_MANAGEMENT_URL)]
    pub management_url: String,

    #[arg(long, env = "FRONTDOOR_API_VERSION", default_value = frontdoor_config::settings::DEFAULT_API_VERSION)]
    pub api_version: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResourceKind {
    Rule,
    Secret,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
