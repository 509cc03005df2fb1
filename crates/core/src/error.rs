//! Error types for vecsearch.
//!
//! This module defines a unified error enum that covers every failure the
//! pipeline can surface: configuration, I/O, embedding, search, remote
//! service errors and local precondition checks.

use thiserror::Error;

/// Unified error type for vecsearch.
///
/// All functions in the workspace return `Result<T, AppError>`.
/// Errors coming back from a remote service keep its status code and
/// message unmodified in [`AppError::Service`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing credentials, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding provider errors raised on our side of the wire
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Search index errors raised on our side of the wire
    #[error("Search error: {0}")]
    Search(String),

    /// A remote service answered with a non-success status
    #[error("{service} API error ({status}): {message}")]
    Service {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// A caller-supplied argument violated a precondition
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Status code of a remote service error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = AppError::Service {
            service: "cohere",
            status: 429,
            message: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "cohere API error (429): quota exceeded");
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_non_service_error_has_no_status() {
        let err = AppError::Precondition("k must be positive".to_string());
        assert_eq!(err.status(), None);
        assert!(err.to_string().starts_with("Precondition failed"));
    }
}
