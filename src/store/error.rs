//! Error types for ticket store backends.

use thiserror::Error;

/// Errors that can occur when talking to a ticket store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The ID token was rejected.
    #[error("Authentication failed: please sign in again")]
    Unauthorized,

    /// Security rules denied the request.
    #[error("Permission denied: you don't have access to the ticket queue")]
    Forbidden,

    /// Document or collection not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store is throttling this client.
    #[error("Rate limited: please wait before retrying")]
    RateLimited,

    /// The store failed on its side.
    #[error("Store server error: {0}")]
    Server(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response could not be understood.
    #[error("Invalid store response: {0}")]
    InvalidResponse(String),

    /// The query is not supported by this backend.
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    /// No signed-in user to act on behalf of.
    #[error("Not signed in")]
    NotSignedIn,

    /// The live feed failed and will not deliver further snapshots.
    #[error("{0}")]
    Feed(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create an error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            401 => StoreError::Unauthorized,
            403 => StoreError::Forbidden,
            404 => StoreError::NotFound(context.to_string()),
            429 => StoreError::RateLimited,
            500..=599 => StoreError::Server(format!("HTTP {}: {}", status, context)),
            _ => StoreError::InvalidResponse(format!("Unexpected HTTP {}: {}", status, context)),
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::RateLimited | StoreError::Server(_) | StoreError::Network(_)
        )
    }
}
