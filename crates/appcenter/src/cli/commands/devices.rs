//! Devices command - export device lists of distribution groups

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::cli::{output, AppArgs, Cli};

/// Download the device list of distribution groups as CSV
#[derive(Debug, Args)]
pub struct DevicesCommand {
    #[command(flatten)]
    pub app: AppArgs,

    /// Distribution group names (comma-separated)
    #[arg(long, value_delimiter = ',', required = true, env = "APPCENTER_DISTRIBUTE_DESTINATIONS")]
    pub groups: Vec<String>,

    /// Write the list to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl DevicesCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(groups = self.groups.len(), "executing devices command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config(self.app.overrides())?;
        let client = cli.client(&config)?;
        let app = cli.resolve_app(&client, &config).await?;

        let mut lists = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            lists.push(client.fetch_devices(&app, group).await?.into_bytes());
        }
        let merged = merge_device_lists(&lists);

        match &self.output {
            Some(path) => {
                std::fs::write(path, &merged)?;
                if cli.is_text() {
                    output::success(&format!("Device list written to {}", path.display()));
                }
            }
            None => std::io::stdout().write_all(&merged)?,
        }

        Ok(())
    }
}

/// Join CSV exports, keeping the header line of the first one only
fn merge_device_lists(lists: &[Vec<u8>]) -> Vec<u8> {
    let mut merged = Vec::new();

    for (i, list) in lists.iter().enumerate() {
        let body = if i == 0 {
            list.as_slice()
        } else {
            match list.iter().position(|&b| b == b'\n') {
                Some(end) => &list[end + 1..],
                None => &[],
            }
        };
        if body.is_empty() {
            continue;
        }
        if !merged.is_empty() && !merged.ends_with(b"\n") {
            merged.push(b'\n');
        }
        merged.extend_from_slice(body);
    }

    merged
}
