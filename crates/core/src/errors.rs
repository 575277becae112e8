//! Core error types for the propdesk back office.
//!
//! This module defines store-agnostic error types. Adapter-specific errors
//! (HTTP, Firestore, Algolia) are converted to these types by the remote layer.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the back office.
///
/// Every failure is scoped to a single user interaction; nothing here is
/// fatal to the process.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Remote store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Search request failed: {0}")]
    Search(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid mutation state transition: {0}")]
    InvalidTransition(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Returns true for errors raised before any local or remote mutation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Returns true when the record does not exist locally or remotely.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Store(StoreError::NotFound(_))
        )
    }

    /// Short message suitable for a transient user notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::Store(StoreError::Network(_)) => {
                "Could not reach the server. Please try again.".to_string()
            }
            Error::Store(StoreError::PermissionDenied(_)) => {
                "You do not have permission to make this change.".to_string()
            }
            Error::Store(StoreError::NotFound(what)) | Error::NotFound(what) => {
                format!("{} no longer exists.", what)
            }
            Error::Validation(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}

/// Store-agnostic error type for remote document operations.
///
/// Uses `String` details so adapters can translate their own error types
/// without leaking them into the core crate.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request never reached the remote store or timed out.
    #[error("Network failure: {0}")]
    Network(String),

    /// The remote store rejected the request.
    #[error("Remote rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The requested document was not found.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The caller lacks permission for the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A document could not be encoded or decoded.
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// Internal/unexpected adapter error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Validation errors for user input, raised before any mutation.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Budget 'from' ({from} L) must be lower than budget 'to' ({to} L)")]
    BudgetRange { from: String, to: String },

    #[error("New price {0} is the same as the current price")]
    UnchangedPrice(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Store(StoreError::Malformed(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
