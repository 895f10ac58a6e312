//! REST request interface and the default HTTP implementation

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde_json::Value;

/// REST failures
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("REST collaborator disabled")]
    Disabled,
}

/// Submit-request/receive-response seam to the service's REST surface
///
/// Retry and rate-limit policy live behind this trait, not in the core.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Perform one request against the API, returning the decoded JSON body
    async fn request(
        &self,
        method: Method,
        route: &str,
        body: Option<Value>,
    ) -> Result<Value, RestError>;
}

/// Default implementation over reqwest
pub struct HttpRestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRestClient {
    /// Default REST base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://api.example.chat/v1";

    /// Create a client authenticating with the given token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            token: token.into(),
        }
    }

    /// Set the REST base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl RestClient for HttpRestClient {
    async fn request(
        &self,
        method: Method,
        route: &str,
        body: Option<Value>,
    ) -> Result<Value, RestError> {
        let url = format!("{}{}", self.base_url, route);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token));
        if let Some(body) = body {
            request = request.json(&body);
        }

        tracing::debug!(method = %method, route = %route, "REST request");

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), route = %route, "REST request failed");
            return Err(RestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for HttpRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRestClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// REST stub that fails every request
///
/// For gateway-only deployments and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRestClient;

#[async_trait]
impl RestClient for NoopRestClient {
    async fn request(
        &self,
        _method: Method,
        _route: &str,
        _body: Option<Value>,
    ) -> Result<Value, RestError> {
        Err(RestError::Disabled)
    }
}
