//! Password storage in the OS keyring.
//!
//! Passwords are keyed by profile name and never written to the config file.

use super::error::{AuthError, Result};

/// The keyring service name for helpqueue passwords.
const KEYRING_SERVICE: &str = "helpqueue";

fn entry(profile_name: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| AuthError::Keyring(format!("failed to access keyring: {}", e)))
}

/// Store the password for `profile_name`.
///
/// # Errors
///
/// Returns an error if the password cannot be stored in the keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<()> {
    entry(profile_name)?
        .set_password(password)
        .map_err(|e| AuthError::Keyring(format!("failed to store password: {}", e)))
}

/// Retrieve the password for `profile_name`.
///
/// # Errors
///
/// Returns an error if no password is stored or the keyring is unavailable.
pub fn get_password(profile_name: &str) -> Result<String> {
    entry(profile_name)?
        .get_password()
        .map_err(|e| AuthError::Keyring(format!("failed to retrieve password: {}", e)))
}

/// Forget the password for `profile_name`.
///
/// # Errors
///
/// Returns an error if the password cannot be removed from the keyring.
pub fn delete_password(profile_name: &str) -> Result<()> {
    entry(profile_name)?
        .delete_password()
        .map_err(|e| AuthError::Keyring(format!("failed to delete password: {}", e)))
}
