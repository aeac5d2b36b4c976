//! Urls command - portal links of an app, without any request

use appcenter_api::urls::{install_url, release_url};
use clap::Args;
use serde_json::json;
use tracing::info;

use crate::cli::{output, AppArgs, Cli, OutputFormat};

/// Print the release page and install page URLs
#[derive(Debug, Args)]
pub struct UrlsCommand {
    #[command(flatten)]
    pub app: AppArgs,

    /// Release id for the release page
    #[arg(long)]
    pub release_id: Option<u64>,
}

impl UrlsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing urls command");
        let config = cli.load_config(self.app.overrides())?;
        let app = config
            .identity()
            .as_resolved()
            .ok_or_else(|| anyhow::anyhow!("Both --owner-name and --app-name are required"))?;

        let install = install_url(config.owner_type, &app.owner_name, &app.app_name);
        let release = self
            .release_id
            .map(|id| release_url(config.owner_type, &app.owner_name, &app.app_name, id));

        if cli.format == OutputFormat::Json {
            output::json(&json!({ "install_url": install, "release_url": release }))?;
        } else {
            if let Some(release) = &release {
                println!("{}", output::key_value("Release page", release));
            }
            println!("{}", output::key_value("Install page", &install));
        }

        Ok(())
    }
}
