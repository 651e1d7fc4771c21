//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// LLM error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            LlmErrorKind::Timeout,
            format!("No response within {}s", after.as_secs()),
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unavailable, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }

    /// Classify a non-success HTTP status from a provider
    pub fn from_status(status: reqwest::StatusCode, message: &str) -> Self {
        match status.as_u16() {
            400 => LlmError::invalid_request(format!("Invalid request: {message}")),
            401 | 403 => LlmError::auth(format!("Authentication failed: {message}")),
            429 => LlmError::rate_limit(format!("Rate limited: {message}")),
            500..=599 => LlmError::server_error(format!("Server error: {message}")),
            _ => LlmError::unknown(format!("HTTP {status}: {message}")),
        }
    }

    /// Classify a transport failure from reqwest
    pub fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::network(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            LlmError::network(format!("Connection failed: {e}"))
        } else {
            LlmError::unknown(format!("Request failed: {e}"))
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Network issues - transient
    Network,
    /// Rate limited (429) - transient
    RateLimit,
    /// Server error (5xx) - transient
    ServerError,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request (400)
    InvalidRequest,
    /// The caller's deadline expired before the provider answered
    Timeout,
    /// No model is configured for this call
    Unavailable,
    /// Unknown error, including unparseable responses
    Unknown,
}

impl LlmErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Network | Self::RateLimit | Self::ServerError | Self::Timeout
        )
    }

    /// The provider cannot serve any request until configuration changes
    pub fn is_unavailable(self) -> bool {
        matches!(self, Self::Unavailable | Self::Auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            LlmError::from_status(StatusCode::UNAUTHORIZED, "x").kind,
            LlmErrorKind::Auth
        );
        assert_eq!(
            LlmError::from_status(StatusCode::TOO_MANY_REQUESTS, "x").kind,
            LlmErrorKind::RateLimit
        );
        assert_eq!(
            LlmError::from_status(StatusCode::BAD_GATEWAY, "x").kind,
            LlmErrorKind::ServerError
        );
        assert_eq!(
            LlmError::from_status(StatusCode::BAD_REQUEST, "x").kind,
            LlmErrorKind::InvalidRequest
        );
        assert_eq!(
            LlmError::from_status(StatusCode::IM_A_TEAPOT, "x").kind,
            LlmErrorKind::Unknown
        );
    }

    #[test]
    fn test_unavailable_kinds() {
        assert!(LlmErrorKind::Unavailable.is_unavailable());
        assert!(LlmErrorKind::Auth.is_unavailable());
        assert!(!LlmErrorKind::Timeout.is_unavailable());
        assert!(LlmErrorKind::Timeout.is_retryable());
    }
}
