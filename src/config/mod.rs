//! Configuration management for helpqueue.
//!
//! This module handles loading, saving, and validating the TOML config file
//! holding connection profiles and application settings.

mod profile;
mod settings;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use profile::Profile;
pub use settings::Settings;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "HELPQUEUE_CONFIG";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    /// The config directory could not be created.
    #[error("failed to create config directory: {0}")]
    CreateDirError(std::io::Error),

    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    ReadError(std::io::Error),

    /// The config file could not be written.
    #[error("failed to write config file: {0}")]
    WriteError(std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The config could not be serialized.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The config parsed but is inconsistent.
    #[error("invalid configuration: {0}")]
    ValidationError(String),

    /// The requested profile does not exist.
    #[error("profile '{0}' not found")]
    ProfileNotFound(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The full contents of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Application settings.
    #[serde(default)]
    pub settings: Settings,
    /// Configured profiles.
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Config {
    /// Default config file location.
    ///
    /// `$HELPQUEUE_CONFIG` if set, otherwise `<config_dir>/helpqueue/config.toml`.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("helpqueue").join("config.toml"))
    }

    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`. A missing file yields the default config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;

        info!(path = %path.display(), profiles = config.profiles.len(), "Loaded config");
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(ConfigError::WriteError)?;

        info!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Check every profile and the profile references.
    pub fn validate(&self) -> Result<()> {
        for (i, profile) in self.profiles.iter().enumerate() {
            profile.validate()?;
            if self.profiles[..i].iter().any(|p| p.name == profile.name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }

        if let Some(default) = &self.settings.default_profile {
            if self.profile(default).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "default_profile '{}' does not match any profile",
                    default
                )));
            }
        }

        Ok(())
    }

    /// Find a profile by name.
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// The default profile: the configured one, or the only one.
    pub fn default_profile(&self) -> Option<&Profile> {
        match &self.settings.default_profile {
            Some(name) => self.profile(name),
            None if self.profiles.len() == 1 => self.profiles.first(),
            None => None,
        }
    }

    /// Make `name` the default profile if none is set yet.
    ///
    /// Returns whether the config changed.
    pub fn adopt_default_profile(&mut self, name: &str) -> bool {
        if self.settings.default_profile.is_some() || self.profile(name).is_none() {
            return false;
        }
        info!(profile = %name, "Adopting default profile");
        self.settings.default_profile = Some(name.to_string());
        true
    }

    /// Resolve `name` if given, else the default profile.
    pub fn resolve_profile(&self, name: Option<&str>) -> Result<&Profile> {
        match name {
            Some(name) => self
                .profile(name)
                .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string())),
            None => self.default_profile().ok_or_else(|| {
                ConfigError::ValidationError(
                    "no profile selected; pass --profile or set settings.default_profile"
                        .to_string(),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn profile(name: &str) -> Profile {
        Profile::new(
            name.to_string(),
            "help-queue-1234".to_string(),
            "AIzaTest".to_string(),
            "desk@example.com".to_string(),
        )
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            settings: Settings {
                default_profile: Some("front-desk".to_string()),
                ..Default::default()
            },
            profiles: vec![profile("front-desk"), profile("lab")],
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[settings\ntheme = 1").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_duplicate_profiles_rejected() {
        let config = Config {
            settings: Settings::default(),
            profiles: vec![profile("lab"), profile("lab")],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate profile"));
    }

    #[test]
    fn test_unknown_default_profile_rejected() {
        let config = Config {
            settings: Settings {
                default_profile: Some("ghost".to_string()),
                ..Default::default()
            },
            profiles: vec![profile("lab")],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_single_profile_is_default() {
        let config = Config {
            settings: Settings::default(),
            profiles: vec![profile("lab")],
        };
        assert_eq!(config.default_profile().unwrap().name, "lab");
    }

    #[test]
    fn test_resolve_profile() {
        let config = Config {
            settings: Settings::default(),
            profiles: vec![profile("lab"), profile("front-desk")],
        };

        assert_eq!(config.resolve_profile(Some("front-desk")).unwrap().name, "front-desk");
        assert!(matches!(
            config.resolve_profile(Some("ghost")),
            Err(ConfigError::ProfileNotFound(_))
        ));
        assert!(matches!(
            config.resolve_profile(None),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_adopt_default_profile_only_once() {
        let mut config = Config {
            settings: Settings::default(),
            profiles: vec![profile("lab"), profile("front-desk")],
        };

        assert!(!config.adopt_default_profile("ghost"));
        assert!(config.adopt_default_profile("front-desk"));
        assert!(!config.adopt_default_profile("lab"));
        assert_eq!(config.resolve_profile(None).unwrap().name, "front-desk");
    }

    #[test]
    #[serial]
    fn test_save_uses_env_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::env::set_var(CONFIG_PATH_ENV, &path);

        let mut config = Config {
            settings: Settings::default(),
            profiles: vec![profile("lab"), profile("front-desk")],
        };
        config.adopt_default_profile("lab");
        let saved = config.save();
        let loaded = Config::load();
        std::env::remove_var(CONFIG_PATH_ENV);

        saved.unwrap();
        assert_eq!(loaded.unwrap().settings.default_profile.as_deref(), Some("lab"));
    }

    #[test]
    #[serial]
    fn test_path_env_override() {
        std::env::set_var(CONFIG_PATH_ENV, "/tmp/helpqueue-test.toml");
        let path = Config::path().unwrap();
        std::env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(path, PathBuf::from("/tmp/helpqueue-test.toml"));
    }

    #[test]
    #[serial]
    fn test_default_path_layout() {
        std::env::remove_var(CONFIG_PATH_ENV);
        if let Ok(path) = Config::path() {
            assert!(path.ends_with("helpqueue/config.toml"));
        }
    }
}
