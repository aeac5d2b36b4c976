//! App Center API operations
//!
//! One method per endpoint. Every method classifies the response status the
//! same way:
//!
//! | Status | Result |
//! |---|---|
//! | 2xx | decoded body |
//! | 401 | [`AppCenterError::Unauthorized`] (fatal) |
//! | 404 | [`AppCenterError::NotFound`] (recoverable) |
//! | 5xx on release upload create/update | [`AppCenterError::ServiceUnavailable`] (fatal) |
//! | other | [`AppCenterError::Status`] (recoverable) |

mod apps;
mod releases;
mod uploads;

use reqwest::{Method, RequestBuilder};
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::error::{AppCenterError, Result};
use crate::http::{ConnectionMode, HttpClient, RawResponse};
use crate::types::AppRef;

/// API version prefix
pub const API_VERSION: &str = "v0.1";

/// App Center API client
#[derive(Debug, Clone)]
pub struct AppCenterClient {
    http: HttpClient,
}

/// Per-endpoint response handling
#[derive(Debug, Clone)]
pub(crate) struct StatusPolicy {
    /// Message for a 404; `None` reports 404 like any other status
    not_found: Option<String>,
    /// Whether 5xx aborts the run
    fatal_server_errors: bool,
    /// Prefix for reported errors
    context: String,
}

impl StatusPolicy {
    pub(crate) fn new(context: impl Into<String>) -> Self {
        Self {
            not_found: None,
            fatal_server_errors: false,
            context: context.into(),
        }
    }

    pub(crate) fn not_found(mut self, message: impl Into<String>) -> Self {
        self.not_found = Some(message.into());
        self
    }

    pub(crate) fn fatal_server_errors(mut self) -> Self {
        self.fatal_server_errors = true;
        self
    }
}

impl AppCenterClient {
    /// Create a new App Center client
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.http
    }

    /// `v0.1/apps/{owner}/{app}/...`
    pub(crate) fn app_request(
        &self,
        method: Method,
        app: &AppRef,
        tail: &[&str],
        mode: ConnectionMode,
    ) -> Result<RequestBuilder> {
        let mut segments = vec![
            API_VERSION,
            "apps",
            app.owner_name.as_str(),
            app.app_name.as_str(),
        ];
        segments.extend_from_slice(tail);
        let url = self.http.endpoint(&segments)?;
        Ok(self.http.api(method, url, mode))
    }

    /// Request against an arbitrary path under the API version
    pub(crate) fn root_request(&self, method: Method, tail: &[&str]) -> Result<RequestBuilder> {
        let mut segments = vec![API_VERSION];
        segments.extend_from_slice(tail);
        let url = self.http.endpoint(&segments)?;
        Ok(self.http.api(method, url, ConnectionMode::Plain))
    }

    /// Send and classify
    pub(crate) async fn execute(
        &self,
        request: RequestBuilder,
        policy: &StatusPolicy,
    ) -> Result<RawResponse> {
        let response = self.http.send(request).await?;
        self.classify(response, policy)
    }

    pub(crate) fn classify(&self, response: RawResponse, policy: &StatusPolicy) -> Result<RawResponse> {
        let status = response.status.as_u16();
        match status {
            200..=299 => {
                if self.http.debug() {
                    debug!("DEBUG: {}", response.pretty());
                }
                Ok(response)
            }
            401 => {
                error!("Auth Error, provided invalid token");
                Err(AppCenterError::Unauthorized)
            }
            404 => match &policy.not_found {
                Some(message) => {
                    error!("Not found, {}", message);
                    Err(AppCenterError::NotFound(message.clone()))
                }
                None => Err(Self::reported(policy, status, &response)),
            },
            500..=599 if policy.fatal_server_errors => {
                error!(status, "Internal Service Error, please try again later");
                Err(AppCenterError::ServiceUnavailable {
                    status,
                    message: response.text(),
                })
            }
            _ => Err(Self::reported(policy, status, &response)),
        }
    }

    fn reported(policy: &StatusPolicy, status: u16, response: &RawResponse) -> AppCenterError {
        let body = response.text();
        error!("{} {}: {}", policy.context, status, body);
        AppCenterError::Status {
            status,
            message: body,
        }
    }
}
