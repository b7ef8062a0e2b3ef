//! Configuration types for feed-session

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Remote page API settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the page API (default: "http://localhost:3000")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Paging behavior for incremental loads and bulk export
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Items requested per incremental page (default: 30)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Items requested per page during bulk export (default: 100)
    #[serde(default = "default_export_page_size")]
    pub export_page_size: u32,

    /// Consecutive failed export pages tolerated before the export gives up (default: 3)
    ///
    /// A failed page does not update the "more available" flag, so an export
    /// against a remote that keeps failing would otherwise never terminate.
    #[serde(default = "default_max_export_failures")]
    pub max_export_failures: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            export_page_size: default_export_page_size(),
            max_export_failures: default_max_export_failures(),
        }
    }
}

/// Presentation-adjacent resources owned by the controller
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Whether to build a cover image handle for the opened source (default: true)
    #[serde(default = "default_true")]
    pub load_covers: bool,

    /// Size parameter appended to cover URLs (default: "200y200")
    #[serde(default = "default_cover_size")]
    pub cover_size: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            load_covers: true,
            cover_size: default_cover_size(),
        }
    }
}

/// Main configuration for [`SessionController`](crate::SessionController)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Remote page API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Page sizes and export limits
    #[serde(default)]
    pub paging: PagingConfig,

    /// Cover image handling
    #[serde(default)]
    pub display: DisplayConfig,

    /// Capacity of the event broadcast channel (default: 1000)
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            paging: PagingConfig::default(),
            display: DisplayConfig::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

impl Config {
    /// Load a JSON config file and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would make the loader misbehave
    pub fn validate(&self) -> Result<()> {
        if self.paging.page_size == 0 {
            return Err(Error::config(
                "page_size must be greater than zero",
                "paging.page_size",
            ));
        }
        if self.paging.export_page_size == 0 {
            return Err(Error::config(
                "export_page_size must be greater than zero",
                "paging.export_page_size",
            ));
        }
        if self.paging.max_export_failures == 0 {
            return Err(Error::config(
                "max_export_failures must be greater than zero",
                "paging.max_export_failures",
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(Error::config(
                "event_channel_capacity must be greater than zero",
                "event_channel_capacity",
            ));
        }
        url::Url::parse(&self.api.base_url).map_err(|e| {
            Error::config(
                format!("invalid base_url '{}': {}", self.api.base_url, e),
                "api.base_url",
            )
        })?;
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("feed-session/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_page_size() -> u32 {
    30
}

fn default_export_page_size() -> u32 {
    100
}

fn default_max_export_failures() -> u32 {
    3
}

fn default_cover_size() -> String {
    "200y200".to_string()
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (integer seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
