//! Fetch version command - latest release of an app

use appcenter_api::AppIdentity;
use clap::Args;
use tracing::info;

use crate::cli::{output, AppArgs, Cli, OutputFormat};

/// Print the latest version of an app
///
/// The owner is looked up from the app list when not given.
#[derive(Debug, Args)]
pub struct FetchVersionCommand {
    #[command(flatten)]
    pub app: AppArgs,
}

impl FetchVersionCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing fetch-version command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config(self.app.overrides())?;
        let client = cli.client(&config)?;
        let app = cli.resolve_app(&client, &config).await?;

        let latest = client.fetch_latest_version(&AppIdentity::from(app)).await?;

        if cli.format == OutputFormat::Json {
            output::json(&latest)?;
        } else if cli.quiet {
            println!("{}", latest.version);
        } else {
            println!("{}", output::header(&latest.app.to_string()));
            println!("{}", output::key_value("Version", &latest.version));
            println!(
                "{}",
                output::key_value("Short version", &latest.release.short_version)
            );
            println!("{}", output::key_value("Release", &latest.release.id.to_string()));
        }

        Ok(())
    }
}
