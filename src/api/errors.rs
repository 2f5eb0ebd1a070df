//! Backend Error Types
//!
//! Error outcomes of a single backend call. The transport gives no structured
//! error payload, so variants carry whatever text the failure produced.

/// Backend call error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({0}): {1}")]
    Server(u16, String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether retrying the same call could succeed
    ///
    /// The synchronization layer never retries on its own; this is for callers
    /// deciding whether to offer a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_) | ApiError::Timeout | ApiError::Server(_, _)
        )
    }

    /// Create an ApiError from an HTTP status code and response body
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            400 | 422 => ApiError::InvalidParams(body.to_string()),
            404 => ApiError::NotFound(body.to_string()),
            408 => ApiError::Timeout,
            500..=599 => ApiError::Server(status, body.to_string()),
            _ => ApiError::Request(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
