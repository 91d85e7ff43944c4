//! Firebase project profile configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// A connection profile for one help-queue project.
///
/// The account password is stored separately in the OS keychain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty and unique across all profiles.
    pub name: String,

    /// The Firebase project id (e.g., "help-queue-1234").
    pub project_id: String,

    /// The project's Web API key, used for sign-in.
    pub api_key: String,

    /// The email of the account used to sign in.
    pub email: String,

    /// Override for the Firestore REST endpoint, e.g. a local emulator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firestore_url: Option<String>,
}

impl Profile {
    /// Create a new profile against the public Firestore endpoint.
    pub fn new(name: String, project_id: String, api_key: String, email: String) -> Self {
        Self {
            name,
            project_id,
            api_key,
            email,
            firestore_url: None,
        }
    }

    /// Validate this profile.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.project_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': project_id cannot be empty",
                self.name
            )));
        }

        if self.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': api_key cannot be empty",
                self.name
            )));
        }

        if !self.email.contains('@') {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': '{}' does not appear to be a valid email address",
                self.name, self.email
            )));
        }

        if let Some(url) = &self.firestore_url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ConfigError::ValidationError(format!(
                    "profile '{}': firestore_url must start with http:// or https://",
                    self.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile::new(
            "front-desk".to_string(),
            "help-queue-1234".to_string(),
            "AIzaTest".to_string(),
            "desk@example.com".to_string(),
        )
    }

    #[test]
    fn test_valid_profile() {
        assert!(profile().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let p = Profile {
            name: String::new(),
            ..profile()
        };
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("name cannot be empty"));
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let p = Profile {
            name: "front desk".to_string(),
            ..profile()
        };
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("cannot contain whitespace"));
    }

    #[test]
    fn test_missing_project_rejected() {
        let p = Profile {
            project_id: " ".to_string(),
            ..profile()
        };
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("project_id"));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let p = Profile {
            api_key: String::new(),
            ..profile()
        };
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_invalid_email_rejected() {
        let p = Profile {
            email: "desk".to_string(),
            ..profile()
        };
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("valid email"));
    }

    #[test]
    fn test_emulator_url_accepted() {
        let p = Profile {
            firestore_url: Some("http://localhost:8080/v1".to_string()),
            ..profile()
        };
        assert!(p.validate().is_ok());

        let p = Profile {
            firestore_url: Some("localhost:8080".to_string()),
            ..profile()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_profile_serialization() {
        let toml_str = toml::to_string(&profile()).unwrap();
        assert!(!toml_str.contains("firestore_url"));

        let parsed: Profile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, profile());
    }
}
