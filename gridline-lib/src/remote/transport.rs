//! Transport seam and the HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::FetchRequest;
use super::FetchResponse;
use crate::error::FetchError;

/// Delivers a fetch request and returns the decoded response.
///
/// A non-success outcome of any kind is an `Err`; retrying is up to the
/// caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request.
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// Posts requests as JSON to an HTTP endpoint.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gridline_lib::remote::HttpTransport;
///
/// let transport = HttpTransport::new("http://localhost:8080/rows")
///     .unwrap()
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(transport.url().path(), "/rows");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: Url,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a transport for `endpoint`.
    pub fn new(endpoint: &str) -> Result<Self, FetchError> {
        let url = Url::parse(endpoint).map_err(|e| FetchError::InvalidUrl(format!("{endpoint}: {e}")))?;
        Ok(Self {
            client: Client::new(),
            url,
            timeout: None,
        })
    }

    /// Uses a preconfigured HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Sets a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The endpoint URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn map_error(&self, error: reqwest::Error) -> FetchError {
        match self.timeout {
            Some(timeout) if error.is_timeout() => FetchError::Timeout(timeout),
            _ => FetchError::Network(error),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let mut builder = self.client.post(self.url.clone()).json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::http(status.as_u16(), body));
        }

        let body = response.text().await.map_err(|e| self.map_error(e))?;
        serde_json::from_str(&body).map_err(|e| FetchError::parse_with_body(e.to_string(), body))
    }
}
