//! Remote fetch error types

use std::time::Duration;

/// Errors that can occur while fetching rows from a remote endpoint.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Non-success HTTP status from the endpoint.
    #[error("HTTP error! status: {status}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// Network error during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the response body.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },

    /// A newer fetch started before this one finished.
    #[error("Request superseded by generation {generation}")]
    Superseded {
        /// Generation of the request that replaced this one.
        generation: u64,
    },

    /// Failure reported by a non-HTTP transport.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl FetchError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Network(_) | Self::Timeout(_) | Self::Transport(_)
        )
    }

    /// Returns `true` if the request was replaced by a newer one.
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(FetchError::http(500, "").is_retryable());
        assert!(FetchError::http(404, "").is_retryable());
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!FetchError::parse("bad json").is_retryable());
        assert!(!FetchError::InvalidUrl("nope".into()).is_retryable());
        assert!(!FetchError::Superseded { generation: 2 }.is_retryable());
    }

    #[test]
    fn test_http_message() {
        assert_eq!(FetchError::http(503, "down").to_string(), "HTTP error! status: 503");
    }
}
