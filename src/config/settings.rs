//! Application settings configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tasks::WAIT_TIME_REFRESH;

/// Longest interval accepted from the config file.
const MAX_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Default seconds between feed polls.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// The name of the default profile to use.
    pub default_profile: Option<String>,
    /// The UI theme to use ("dark" or "light").
    pub theme: String,
    /// Seconds between wait-time refreshes.
    pub refresh_interval_secs: u64,
    /// Seconds between feed polls against the remote store.
    pub poll_interval_secs: u64,
}

impl Settings {
    /// The wait-time refresh period.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.clamp(1, MAX_INTERVAL_SECS))
    }

    /// The feed poll period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.clamp(1, MAX_INTERVAL_SECS))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: None,
            theme: "dark".to_string(),
            refresh_interval_secs: WAIT_TIME_REFRESH.as_secs(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}
