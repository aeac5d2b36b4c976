//! HTTP client adapter
//!
//! Wraps a `reqwest` client bound to the API root. Every API request carries
//! the token header and the client identification header; transfers to
//! server-issued upload URLs only carry the latter.

use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{AppCenterError, Result};

/// Token header name
pub const TOKEN_HEADER: &str = "X-API-Token";

/// Client identification header name
pub const SOURCE_HEADER: &str = "internal-request-source";

/// Client identification header value
pub const SOURCE_VALUE: &str = "appcenter-cli";

const MAX_REDIRECTS: usize = 10;

/// How a request body is encoded and its response decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// JSON request and response bodies
    Plain,
    /// Multipart form body for binary uploads
    Multipart,
    /// Raw byte body for symbol uploads
    RawUpload,
    /// CSV response, never decoded
    Csv,
}

/// Buffered response
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let body = if self.body.iter().all(|b| b.is_ascii_whitespace()) {
            b"null".as_slice()
        } else {
            self.body.as_slice()
        };
        Ok(serde_json::from_slice(body)?)
    }

    /// Body as text, for error messages
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Pretty-printed JSON body, or the raw text when it is not JSON
    pub fn pretty(&self) -> String {
        serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|v| serde_json::to_string_pretty(&v).ok())
            .unwrap_or_else(|| self.text())
    }
}

/// HTTP client bound to an API root
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    api_token: String,
    debug: bool,
}

impl HttpClient {
    /// Build a client from configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("appcenter-api/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .use_rustls_tls()
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().clone(),
            api_token: config.api_token().to_string(),
            debug: config.debug(),
        })
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Build an endpoint URL from unencoded path segments
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                AppCenterError::invalid_config("base_url", "API root cannot have a path")
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Authenticated request against the API
    pub fn api(&self, method: Method, url: Url, mode: ConnectionMode) -> RequestBuilder {
        self.request(method, url, mode)
            .header(TOKEN_HEADER, &self.api_token)
    }

    /// Unauthenticated request, used for server-issued upload URLs
    pub fn transfer(
        &self,
        method: Method,
        url: &str,
        mode: ConnectionMode,
        timeout: Duration,
    ) -> Result<RequestBuilder> {
        let url = Url::parse(url)?;
        Ok(self.request(method, url, mode).timeout(timeout))
    }

    fn request(&self, method: Method, url: Url, mode: ConnectionMode) -> RequestBuilder {
        debug!(%method, %url, ?mode, "App Center request");
        let builder = self
            .client
            .request(method, url)
            .header(SOURCE_HEADER, SOURCE_VALUE);

        match mode {
            ConnectionMode::Plain => builder.header(ACCEPT, HeaderValue::from_static("application/json")),
            ConnectionMode::Csv => builder.header(ACCEPT, HeaderValue::from_static("text/csv")),
            ConnectionMode::RawUpload => {
                builder.header(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))
            }
            ConnectionMode::Multipart => builder,
        }
    }

    /// Send a request and buffer the response
    pub async fn send(&self, request: RequestBuilder) -> Result<RawResponse> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        debug!(status = status.as_u16(), bytes = body.len(), "App Center response");
        Ok(RawResponse { status, body })
    }
}
