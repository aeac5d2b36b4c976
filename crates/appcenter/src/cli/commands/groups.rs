//! Groups command - list distribution groups

use clap::Args;
use console::style;
use tracing::info;

use crate::cli::{output, AppArgs, Cli, OutputFormat};

/// List distribution groups of an app
#[derive(Debug, Args)]
pub struct GroupsCommand {
    #[command(flatten)]
    pub app: AppArgs,
}

impl GroupsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing groups command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config(self.app.overrides())?;
        let client = cli.client(&config)?;
        let app = cli.resolve_app(&client, &config).await?;

        let groups = client.list_distribution_groups(&app).await?;

        if cli.format == OutputFormat::Json {
            output::json(&groups)?;
        } else if !cli.quiet {
            if groups.is_empty() {
                println!("No groups found");
            } else {
                println!("{}", output::header("Distribution Groups"));
                println!();
                for group in &groups {
                    match &group.display_name {
                        Some(display) if display != &group.name => {
                            println!("  {} {}", style(&group.name).cyan(), style(display).dim())
                        }
                        _ => println!("  {}", style(&group.name).cyan()),
                    }
                }
            }
        }

        Ok(())
    }
}
