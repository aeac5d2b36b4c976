//! App Center error types

use thiserror::Error;

/// How an error affects the surrounding run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Invalid credential or missing identifiers; abort the run
    FatalUser,
    /// Server-side failure on an upload/commit path; abort and try again later
    FatalService,
    /// Reported to the caller, which decides whether to continue
    Recoverable,
}

/// App Center errors
#[derive(Debug, Error)]
pub enum AppCenterError {
    /// 401 from any endpoint
    #[error("Auth Error, provided invalid token")]
    Unauthorized,

    /// 5xx while creating or updating a release upload
    #[error("Internal Service Error, please try again later ({status}): {message}")]
    ServiceUnavailable { status: u16, message: String },

    /// 404 from an endpoint
    #[error("Not found, {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("Error {status}: {message}")]
    Status { status: u16, message: String },

    /// Transfer to the upload URL failed and the session was aborted
    #[error("Error uploading {artifact} {status}: {message}")]
    UploadFailed {
        artifact: String,
        status: u16,
        message: String,
    },

    /// Invalid or missing configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfig { field: String, message: String },

    /// Artifact missing or of an unsupported type
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// App (or its owner) could not be resolved
    #[error("No app '{0}' found")]
    AppNotFound(String),

    /// App has no releases
    #[error("No versions found: {0}")]
    NoVersions(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppCenterError {
    /// Classify the error
    pub fn class(&self) -> ErrorClass {
        match self {
            AppCenterError::Unauthorized
            | AppCenterError::InvalidConfig { .. }
            | AppCenterError::InvalidArtifact(_)
            | AppCenterError::AppNotFound(_)
            | AppCenterError::NoVersions(_)
            | AppCenterError::Io(_)
            | AppCenterError::Url(_) => ErrorClass::FatalUser,
            AppCenterError::ServiceUnavailable { .. } => ErrorClass::FatalService,
            AppCenterError::NotFound(_)
            | AppCenterError::Status { .. }
            | AppCenterError::UploadFailed { .. }
            | AppCenterError::Http(_)
            | AppCenterError::Json(_) => ErrorClass::Recoverable,
        }
    }

    /// Whether the error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        self.class() != ErrorClass::Recoverable
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            AppCenterError::Unauthorized => Some(401),
            AppCenterError::NotFound(_) => Some(404),
            AppCenterError::ServiceUnavailable { status, .. }
            | AppCenterError::Status { status, .. }
            | AppCenterError::UploadFailed { status, .. } => Some(*status),
            AppCenterError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn invalid_config(field: &str, message: impl Into<String>) -> Self {
        AppCenterError::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for App Center operations
pub type Result<T> = std::result::Result<T, AppCenterError>;
