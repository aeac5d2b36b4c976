//! Upload command - run the release pipeline

use std::path::PathBuf;

use anyhow::Context;
use appcenter_api::pipeline::DEFAULT_RELEASE_NOTES;
use appcenter_api::{DestinationType, DistributionReport, ReleasePipeline};
use appcenter_core::ConfigOverrides;
use clap::Args;
use console::style;
use tracing::info;

use crate::cli::{output, AppArgs, Cli, OutputFormat};
use crate::exit_codes::PartialDistribution;

/// Upload a build and distribute the release
#[derive(Debug, Args)]
pub struct UploadCommand {
    #[command(flatten)]
    pub app: AppArgs,

    /// Build to upload (apk, aab, ipa, app.zip, dmg, pkg, msi, msix, appx, zip)
    #[arg(long, env = "APPCENTER_DISTRIBUTE_FILE")]
    pub file: Option<PathBuf>,

    /// dSYM bundle or zipped dSYM to upload
    #[arg(long, env = "APPCENTER_DISTRIBUTE_DSYM")]
    pub dsym: Option<PathBuf>,

    /// Android Proguard mapping file to upload
    #[arg(long, env = "APPCENTER_DISTRIBUTE_ANDROID_MAPPING")]
    pub mapping: Option<PathBuf>,

    /// Build version shown in App Center
    #[arg(long, env = "APPCENTER_DISTRIBUTE_VERSION")]
    pub build_version: Option<String>,

    /// Build number shown in App Center
    #[arg(long, env = "APPCENTER_DISTRIBUTE_BUILD_NUMBER")]
    pub build_number: Option<String>,

    /// Release notes
    #[arg(long, env = "APPCENTER_DISTRIBUTE_RELEASE_NOTES")]
    pub release_notes: Option<String>,

    /// Path to file containing release notes
    #[arg(long, conflicts_with = "release_notes")]
    pub release_notes_file: Option<PathBuf>,

    /// DSA signature of the build (macOS Sparkle updates)
    #[arg(long, env = "APPCENTER_DISTRIBUTE_DSA_SIGNATURE")]
    pub dsa_signature: Option<String>,

    /// Destination names (comma-separated)
    #[arg(long, value_delimiter = ',', env = "APPCENTER_DISTRIBUTE_DESTINATIONS")]
    pub destinations: Option<Vec<String>>,

    /// Destination type: group or store
    #[arg(long, env = "APPCENTER_DISTRIBUTE_DESTINATION_TYPE")]
    pub destination_type: Option<DestinationType>,

    /// Force testers to install the update
    #[arg(long, env = "APPCENTER_DISTRIBUTE_MANDATORY_UPDATE")]
    pub mandatory_update: Option<bool>,

    /// Notify testers by email
    #[arg(long, env = "APPCENTER_DISTRIBUTE_NOTIFY_TESTERS")]
    pub notify_testers: Option<bool>,

    /// Transfer timeout in seconds
    #[arg(long, env = "APPCENTER_DISTRIBUTE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Display name used when the app has to be created
    #[arg(long, env = "APPCENTER_APP_DISPLAY_NAME")]
    pub app_display_name: Option<String>,

    /// OS used when the app has to be created (e.g. Android, iOS)
    #[arg(long, env = "APPCENTER_APP_OS")]
    pub app_os: Option<String>,

    /// Platform used when the app has to be created (e.g. Java, Objective-C-Swift)
    #[arg(long, env = "APPCENTER_APP_PLATFORM")]
    pub app_platform: Option<String>,
}

impl UploadCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing upload command");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            timeout: self.timeout,
            destinations: self.destinations.clone(),
            destination_type: self.destination_type,
            mandatory_update: self.mandatory_update,
            notify_testers: self.notify_testers,
            display_name: self.app_display_name.clone(),
            os: self.app_os.clone(),
            platform: self.app_platform.clone(),
            ..self.app.overrides()
        }
    }

    fn release_notes(&self) -> anyhow::Result<String> {
        if let Some(ref notes_file) = self.release_notes_file {
            return std::fs::read_to_string(notes_file)
                .with_context(|| format!("Failed to read notes file {}", notes_file.display()));
        }
        Ok(self
            .release_notes
            .clone()
            .unwrap_or_else(|| DEFAULT_RELEASE_NOTES.to_string()))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config(self.overrides())?;
        let client = cli.client(&config)?;
        let app = cli.resolve_app(&client, &config).await?;

        let mut pipeline = ReleasePipeline::new(app);
        pipeline.owner_type = config.owner_type;
        pipeline.binary = self.file.clone();
        pipeline.dsym = self.dsym.clone();
        pipeline.mapping = self.mapping.clone();
        pipeline.build_version = self.build_version.clone();
        pipeline.build_number = self.build_number.clone();
        pipeline.release_notes = self.release_notes()?;
        pipeline.dsa_signature = self.dsa_signature.clone().unwrap_or_default();
        pipeline.distribute = config.distribute_options();
        pipeline.create_app = config.new_app();
        pipeline.timeout = config.timeout();
        pipeline.validate()?;

        if cli.is_text() {
            println!();
            println!("{}", style("Uploading to App Center...").bold());
            println!("{}", output::key_value("App", &pipeline.app.to_string()));
            for (label, path) in [
                ("File", &pipeline.binary),
                ("dSYM", &pipeline.dsym),
                ("Mapping", &pipeline.mapping),
            ] {
                if let Some(path) = path {
                    println!("  {}: {}", style(label).dim(), style(path.display()).cyan());
                }
            }
            if !pipeline.distribute.destinations.is_empty() {
                println!(
                    "{}",
                    output::key_value(
                        &format!("{}s", pipeline.distribute.destination_type),
                        &pipeline.distribute.destinations.join(", ")
                    )
                );
            }
            println!();
        }

        let report = pipeline.run(&client).await?;

        if cli.format == OutputFormat::Json {
            output::json(&report)?;
        } else if !cli.quiet {
            print_report(&report);
        }

        if !report.is_complete() {
            return Err(PartialDistribution {
                failed: report.failed.len(),
                total: report.failed.len() + report.distributed.len(),
            }
            .into());
        }
        Ok(())
    }
}

fn print_report(report: &DistributionReport) {
    if report.created_app {
        output::info("App did not exist and was created");
    }
    if report.dsym_uploaded {
        output::success("dSYM uploaded");
    }
    if report.mapping_uploaded {
        output::success("Mapping uploaded");
    }

    let Some(release) = &report.release else {
        return;
    };

    output::success("Upload completed!");
    println!("{}", output::key_value("Release", &release.id.to_string()));
    println!("{}", output::key_value("Version", &release.short_version));
    println!("{}", output::key_value("Build", &release.version));
    if let Some(url) = &report.download_url {
        println!("{}", output::key_value("Download", url));
    }
    if let Some(url) = &report.release_url {
        println!("{}", output::key_value("Release page", url));
    }
    if let Some(url) = &report.install_url {
        println!("{}", output::key_value("Install page", url));
    }
    if report.metadata_updated {
        println!("{}", output::key_value("Metadata", "DSA signature attached"));
    }

    for name in &report.distributed {
        output::success(&format!("Distributed to '{}'", name));
    }
    for failed in &report.failed {
        output::warning(&format!("Not distributed to '{}': {}", failed.name, failed.reason));
    }
}
