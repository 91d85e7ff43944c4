//! Authentication error types.

use thiserror::Error;

/// Errors that can occur while signing in or refreshing credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password rejected by the identity service.
    #[error("Sign-in failed: {0}")]
    InvalidCredentials(String),

    /// There is no signed-in user to refresh.
    #[error("Not signed in")]
    NotSignedIn,

    /// OS keyring could not be read or written.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The identity service answered with something unexpected.
    #[error("Invalid identity service response: {0}")]
    InvalidResponse(String),
}

/// Result type for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Map an Identity Toolkit error code to an error.
    ///
    /// Codes look like `INVALID_PASSWORD` or
    /// `TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account...`.
    pub fn from_identity_code(code: &str) -> Self {
        let short = code.split(':').next().unwrap_or(code).trim();
        match short {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_EMAIL" => AuthError::InvalidCredentials("wrong email or password".to_string()),
            "USER_DISABLED" => AuthError::InvalidCredentials("this account is disabled".to_string()),
            "TOO_MANY_ATTEMPTS_TRY_LATER" => {
                AuthError::InvalidCredentials("too many attempts, try again later".to_string())
            }
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
                AuthError::InvalidCredentials("session expired, sign in again".to_string())
            }
            other => AuthError::InvalidResponse(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_password() {
        let err = AuthError::from_identity_code("INVALID_PASSWORD");
        assert!(matches!(err, AuthError::InvalidCredentials(_)));
        assert!(err.to_string().contains("wrong email or password"));
    }

    #[test]
    fn test_code_with_detail() {
        let err = AuthError::from_identity_code(
            "TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled",
        );
        assert!(err.to_string().contains("too many attempts"));
    }

    #[test]
    fn test_unknown_code() {
        let err = AuthError::from_identity_code("OPERATION_NOT_ALLOWED");
        assert!(matches!(err, AuthError::InvalidResponse(ref c) if c == "OPERATION_NOT_ALLOWED"));
    }
}
