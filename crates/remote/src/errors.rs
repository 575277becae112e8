//! Adapter-specific error types.
//!
//! HTTP and codec failures are kept here and converted to the store-agnostic
//! [`StoreError`] defined in `propdesk_core` before leaving the crate.

use propdesk_core::errors::{Error, StoreError};
use thiserror::Error;

/// Result type alias for raw adapter calls.
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Errors raised while talking to Firestore or Algolia.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP client error (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the remote API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A document value that the codec cannot represent
    #[error("Codec error: {0}")]
    Codec(String),

    /// Invalid client configuration or request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RemoteError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

impl From<RemoteError> for StoreError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Http(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                StoreError::Network(e.to_string())
            }
            RemoteError::Http(e) => match e.status() {
                Some(status) => StoreError::Rejected {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => StoreError::Network(e.to_string()),
            },
            RemoteError::Json(e) => StoreError::Malformed(e.to_string()),
            RemoteError::Codec(message) => StoreError::Malformed(message),
            RemoteError::Api { status: 404, message } => StoreError::NotFound(message),
            RemoteError::Api {
                status: 401 | 403,
                message,
            } => StoreError::PermissionDenied(message),
            RemoteError::Api { status, message } => StoreError::Rejected { status, message },
            RemoteError::InvalidRequest(message) => StoreError::Internal(message),
        }
    }
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        Error::Store(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_status_mapping() {
        assert!(matches!(
            StoreError::from(RemoteError::api(404, "gone")),
            StoreError::NotFound(_)
        ));
        assert!(matches!(
            StoreError::from(RemoteError::api(403, "denied")),
            StoreError::PermissionDenied(_)
        ));
        assert!(matches!(
            StoreError::from(RemoteError::api(409, "exists")),
            StoreError::Rejected { status: 409, .. }
        ));
    }

    #[test]
    fn test_codec_error_is_malformed() {
        let err: Error = RemoteError::codec("bad value").into();
        assert!(matches!(err, Error::Store(StoreError::Malformed(_))));
    }
}
