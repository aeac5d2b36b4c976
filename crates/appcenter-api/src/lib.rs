//! App Center REST API client
//!
//! Uploads builds and debug symbols, manages releases and distributes them
//! to groups and stores.
//!
//! ## Upload flow
//!
//! Every upload follows the same protocol: create a session, transfer the
//! bytes to the server-issued URL, then commit the session (or abort it when
//! the transfer failed).
//!
//! ## Usage
//!
//! ```ignore
//! use appcenter_api::{AppCenterClient, AppRef, ClientConfig, ReleasePipeline};
//!
//! let client = AppCenterClient::new(&ClientConfig::from_env()?)?;
//! let mut pipeline = ReleasePipeline::new(AppRef::new("owner", "app")?);
//! pipeline.binary = Some("build/app.apk".into());
//! let report = pipeline.run(&client).await?;
//! ```
//!
//! ## Errors
//!
//! Every error has an [`ErrorClass`]: fatal errors abort the run, recoverable
//! ones are reported and the caller decides whether to continue.

pub mod api;
pub mod artifact;
pub mod config;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod resolve;
pub mod types;
pub mod upload;
pub mod urls;

pub use api::AppCenterClient;
pub use artifact::{full_extension, ArtifactKind};
pub use config::ClientConfig;
pub use error::{AppCenterError, ErrorClass, Result};
pub use pipeline::{DistributeOptions, DistributionReport, FailedDestination, ReleasePipeline};
pub use resolve::LatestVersion;
pub use types::*;
