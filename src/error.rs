//! Centralized error types for helpqueue.
//!
//! Each layer has its own `thiserror` enum; [`AppError`] aggregates them and
//! turns them into messages fit for the status area.

use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Ticket store errors.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Sign-in errors.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// IO errors (file system, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal-related errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Create a terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        AppError::Terminal(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::CreateDirError(_) | ConfigError::WriteError(_) => {
                    "Could not save configuration. Please check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check it is readable.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Could not save configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
                ConfigError::ProfileNotFound(name) => format!("Profile '{}' not found.", name),
            },
            AppError::Store(e) => match e {
                StoreError::Unauthorized | StoreError::NotSignedIn => {
                    "Your session has expired. Please sign in again.".to_string()
                }
                StoreError::Forbidden => {
                    "Access denied. Your account cannot modify the queue.".to_string()
                }
                StoreError::NotFound(_) => {
                    "That ticket no longer exists. It may have been closed elsewhere.".to_string()
                }
                StoreError::RateLimited => {
                    "Too many requests. Please wait a moment and try again.".to_string()
                }
                StoreError::Server(_) => "The queue server had a problem. Please try again.".to_string(),
                StoreError::Network(_) => {
                    "Connection failed. Please check your internet connection.".to_string()
                }
                StoreError::InvalidResponse(_) | StoreError::UnsupportedQuery(_) => {
                    "Unexpected response from the queue server.".to_string()
                }
                StoreError::Feed(msg) => msg.clone(),
            },
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials(reason) => format!("Sign-in failed: {}.", reason),
                AuthError::NotSignedIn => "You are not signed in.".to_string(),
                AuthError::Keyring(_) => {
                    "No saved password. Run 'helpqueue login' first.".to_string()
                }
                AuthError::Network(_) => {
                    "Could not reach the sign-in service. Please check your connection.".to_string()
                }
                AuthError::InvalidResponse(_) => {
                    "Unexpected response from the sign-in service.".to_string()
                }
            },
            AppError::Io(_) => "A file operation failed. Please check file permissions.".to_string(),
            AppError::Terminal(msg) => format!("Terminal error: {}", msg),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Whether the error prevents the application from doing anything useful.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Store(StoreError::Forbidden)
                | AppError::Store(StoreError::Feed(_))
                | AppError::Terminal(_)
        )
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
