//! App command - existence check and creation

use appcenter_api::NewApp;
use appcenter_core::ConfigOverrides;
use clap::{Args, Subcommand};
use console::style;
use serde_json::json;
use tracing::info;

use crate::cli::{output, AppArgs, Cli, OutputFormat};

/// Check or create apps
#[derive(Debug, Args)]
pub struct AppCommand {
    #[command(subcommand)]
    pub subcommand: AppSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum AppSubcommand {
    /// Check whether an app exists
    Exists {
        #[command(flatten)]
        app: AppArgs,
    },

    /// Create an app
    Create {
        #[command(flatten)]
        app: AppArgs,

        /// Display name, defaults to the app name
        #[arg(long, env = "APPCENTER_APP_DISPLAY_NAME")]
        display_name: Option<String>,

        /// OS (e.g. Android, iOS, macOS, Windows)
        #[arg(long, env = "APPCENTER_APP_OS")]
        os: Option<String>,

        /// Platform (e.g. Java, Objective-C-Swift, React-Native)
        #[arg(long, env = "APPCENTER_APP_PLATFORM")]
        platform: Option<String>,
    },
}

impl AppCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let subcommand_name = match &self.subcommand {
            AppSubcommand::Exists { .. } => "exists",
            AppSubcommand::Create { .. } => "create",
        };
        info!(subcommand = subcommand_name, "executing app command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.subcommand {
            AppSubcommand::Exists { app } => self.exists(app, cli).await,
            AppSubcommand::Create {
                app,
                display_name,
                os,
                platform,
            } => {
                let overrides = ConfigOverrides {
                    display_name: display_name.clone(),
                    os: os.clone(),
                    platform: platform.clone(),
                    ..app.overrides()
                };
                self.create(overrides, cli).await
            }
        }
    }

    async fn exists(&self, args: &AppArgs, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config(args.overrides())?;
        let client = cli.client(&config)?;
        let app = config
            .identity()
            .as_resolved()
            .ok_or_else(|| anyhow::anyhow!("Both --owner-name and --app-name are required"))?;

        let exists = client.app_exists(&app).await?;

        if cli.format == OutputFormat::Json {
            output::json(&json!({ "app": app, "exists": exists }))?;
        } else if cli.quiet {
            println!("{}", exists);
        } else if exists {
            output::success(&format!("App {} exists", style(&app).cyan()));
        } else {
            output::warning(&format!("App {} does not exist", style(&app).cyan()));
        }

        Ok(())
    }

    async fn create(&self, overrides: ConfigOverrides, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config(overrides)?;
        let client = cli.client(&config)?;

        let owner_name = config
            .owner_name
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--owner-name is required"))?;
        let new_app: NewApp = config
            .new_app()
            .ok_or_else(|| anyhow::anyhow!("--app-name, --os and --platform are required"))?;

        let created = client
            .create_app(config.owner_type, &owner_name, &new_app)
            .await?;

        if cli.format == OutputFormat::Json {
            output::json(&created)?;
        } else if !cli.quiet {
            output::success(&format!(
                "Created {}/{} app '{}' for {} '{}'",
                new_app.os,
                new_app.platform,
                style(&created.name).cyan(),
                config.owner_type,
                owner_name
            ));
        }

        Ok(())
    }
}
