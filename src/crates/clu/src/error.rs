//! Error types for the CLU recognizer.

use thiserror::Error;

/// Result type for CLU operations.
pub type Result<T> = std::result::Result<T, CluError>;

/// Errors that can occur when configuring, calling or normalizing CLU.
#[derive(Debug, Error)]
pub enum CluError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize/deserialize data.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid project, deployment, key or endpoint settings.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The service rejected the endpoint key.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Service temporarily unavailable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service answered with a non-success status.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// The response is missing required structure (`prediction`, `projectKind`).
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Request timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// I/O error while reading configuration or saved responses.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

impl CluError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            CluError::HttpError(e) => e.is_timeout() || e.is_connect(),
            CluError::ServiceUnavailable(_)
            | CluError::Timeout(_)
            | CluError::RateLimitExceeded(_) => true,
            _ => false,
        }
    }

    /// Check if this error is due to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, CluError::AuthenticationError(_))
    }

    /// Check if this error was raised before any network call was attempted.
    pub fn is_config_error(&self) -> bool {
        matches!(self, CluError::ConfigError(_))
    }
}

impl From<serde_json::Error> for CluError {
    fn from(err: serde_json::Error) -> Self {
        CluError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CluError {
    fn from(err: serde_yaml::Error) -> Self {
        CluError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(CluError::ServiceUnavailable("503".to_string()).is_retryable());
        assert!(CluError::RateLimitExceeded("429".to_string()).is_retryable());
        assert!(CluError::Timeout("slow".to_string()).is_retryable());
        assert!(!CluError::MalformedResponse("no prediction".to_string()).is_retryable());
        assert!(!CluError::ConfigError("bad key".to_string()).is_retryable());
    }

    #[test]
    fn test_auth_and_config_classification() {
        assert!(CluError::AuthenticationError("401".to_string()).is_auth_error());
        assert!(!CluError::ProviderError("500".to_string()).is_auth_error());
        assert!(CluError::ConfigError("blank".to_string()).is_config_error());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let clu: CluError = err.into();
        assert!(matches!(clu, CluError::SerializationError(_)));
    }
}
