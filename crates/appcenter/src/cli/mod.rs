//! CLI definition and command handling

pub mod commands;
pub mod output;

use anyhow::Context;
use appcenter_api::config::{debug_from_env, API_URL_ENV, TOKEN_ENV};
use appcenter_api::{AppCenterClient, AppRef, ClientConfig, OwnerType};
use appcenter_core::{load_config_or_default, Config, ConfigOverrides};
use clap::{Args, Parser, Subcommand};
use console::Term;
use dialoguer::Select;
use tracing::debug;

use commands::{
    AppCommand, CompletionsCommand, DevicesCommand, FetchVersionCommand, GroupsCommand,
    UploadCommand, UrlsCommand,
};

/// App Center - upload, release and distribute apps
#[derive(Debug, Parser)]
#[command(name = "appcenter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log every response body
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    /// API token
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    pub api_token: Option<String>,

    /// API root
    #[arg(long, global = true, env = API_URL_ENV)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload a build and distribute the release
    Upload(UploadCommand),

    /// Print the latest version of an app
    FetchVersion(FetchVersionCommand),

    /// List distribution groups
    Groups(GroupsCommand),

    /// Download the device list of distribution groups
    Devices(DevicesCommand),

    /// Check or create apps
    App(AppCommand),

    /// Print portal URLs of an app
    Urls(UrlsCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// App coordinates shared by every command
#[derive(Debug, Clone, Default, Args)]
pub struct AppArgs {
    /// Owner of the app (user or organization name)
    #[arg(long, env = "APPCENTER_OWNER_NAME")]
    pub owner_name: Option<String>,

    /// Owner type: user or organization
    #[arg(long, env = "APPCENTER_OWNER_TYPE")]
    pub owner_type: Option<OwnerType>,

    /// App name as used in the API
    #[arg(long, env = "APPCENTER_APP_NAME")]
    pub app_name: Option<String>,
}

impl AppArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            owner_name: self.owner_name.clone(),
            owner_type: self.owner_type,
            app_name: self.app_name.clone(),
            ..Default::default()
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("cannot enter {}", dir.display()))?;
        }

        match self.command {
            Commands::Upload(ref cmd) => cmd.execute(&self),
            Commands::FetchVersion(ref cmd) => cmd.execute(&self),
            Commands::Groups(ref cmd) => cmd.execute(&self),
            Commands::Devices(ref cmd) => cmd.execute(&self),
            Commands::App(ref cmd) => cmd.execute(&self),
            Commands::Urls(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }

    /// Whether human-readable output should be printed
    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text && !self.quiet
    }

    /// Response-body logging, from `--debug` or the `DEBUG` variable
    pub fn debug_enabled(&self) -> bool {
        self.debug || debug_from_env()
    }

    /// Project file merged with command line overrides
    pub fn load_config(&self, overrides: ConfigOverrides) -> anyhow::Result<Config> {
        let cwd = std::env::current_dir()?;
        let (mut config, path) = load_config_or_default(&cwd)?;
        if let Some(path) = path {
            debug!(path = %path.display(), "using project config");
        }

        if self.api_url.is_some() {
            config.api_url = self.api_url.clone();
        }
        config.apply(overrides);
        Ok(config)
    }

    /// API client for the merged configuration
    pub fn client(&self, config: &Config) -> anyhow::Result<AppCenterClient> {
        let token = self.api_token.clone().unwrap_or_default();
        let mut client_config =
            ClientConfig::new(token)?.with_debug(self.debug_enabled());
        if let Some(url) = &config.api_url {
            client_config = client_config.with_base_url(url)?;
        }
        Ok(AppCenterClient::new(&client_config)?)
    }

    /// Resolve owner and app name, prompting when the app name is unknown
    ///
    /// Without a terminal the first matching app is used.
    pub async fn resolve_app(
        &self,
        client: &AppCenterClient,
        config: &Config,
    ) -> anyhow::Result<AppRef> {
        let identity = config.identity();
        if let Some(app) = identity.as_resolved() {
            return Ok(app);
        }

        if identity.app_name.is_none() && self.is_text() && Term::stderr().is_term() {
            let apps: Vec<_> = client
                .list_apps()
                .await?
                .into_iter()
                .filter(|app| {
                    identity
                        .owner_name
                        .as_deref()
                        .map_or(true, |owner| app.owner_name() == Some(owner))
                })
                .collect();

            let items: Vec<String> = apps
                .iter()
                .map(|app| format!("{}/{}", app.owner_name().unwrap_or("?"), app.name))
                .collect();
            if items.is_empty() {
                anyhow::bail!("No apps found for this token");
            }

            let selection = Select::new()
                .with_prompt("Select an app")
                .items(&items)
                .default(0)
                .interact()?;
            let app = &apps[selection];
            let owner = app
                .owner_name()
                .context("selected app has no owner")?;
            return Ok(AppRef::new(owner, app.name.clone())?);
        }

        Ok(client.resolve_app(&identity).await?)
    }
}
