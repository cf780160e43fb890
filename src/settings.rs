//! Client configuration

use crate::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding [`Settings::api_base_url`]
pub const ENV_API_URL: &str = "PORTAL_API_URL";
/// Environment variable overriding [`Settings::request_timeout_ms`]
pub const ENV_REQUEST_TIMEOUT_MS: &str = "PORTAL_REQUEST_TIMEOUT_MS";
/// Environment variable overriding [`Settings::poll_interval_ms`]
pub const ENV_POLL_INTERVAL_MS: &str = "PORTAL_POLL_INTERVAL_MS";

/// Messaging client settings
///
/// Settings are stored in JSON format and can be loaded/saved from disk.
/// Missing fields take their default values.
///
/// # Example
/// ```rust,no_run
/// use portal_messaging::Settings;
///
/// let mut settings = Settings::load("portal_settings.json").expect("Failed to load");
/// settings.apply_env_overrides().expect("Invalid environment override");
///
/// println!("Backend: {}", settings.api_base_url);
/// println!("Polling every {:?}", settings.poll_interval());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend base URL, without trailing slash
    pub api_base_url: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Conversation list polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// `limit` sent to the admin user directory
    pub admin_contact_limit: u32,
    /// Maximum message length in characters
    pub max_message_length: usize,
}

impl Settings {
    /// Load settings from a JSON file
    ///
    /// Returns default settings if the file doesn't exist or is empty.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Settings(format!("Failed to read settings: {}", e)))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Self = serde_json::from_str(&data)
            .map_err(|e| Error::Settings(format!("Failed to parse settings: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a JSON file, creating parent directories
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Settings(format!("Failed to create settings directory: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Settings(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, json)
            .map_err(|e| Error::Settings(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }

    /// Apply `PORTAL_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            self.request_timeout_ms = parse_millis(ENV_REQUEST_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_millis(ENV_POLL_INTERVAL_MS, &raw)?;
        }
        self.validate()
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.request_timeout_ms == 0 {
            return Err(Error::Settings("request_timeout_ms must be positive".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Settings("poll_interval_ms must be positive".to_string()));
        }
        if self.max_message_length == 0 {
            return Err(Error::Settings("max_message_length must be positive".to_string()));
        }
        Ok(())
    }

    /// Parsed backend base URL
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(self.api_base_url.trim_end_matches('/'))
            .map_err(|e| Error::Settings(format!("Invalid api_base_url {:?}: {}", self.api_base_url, e)))
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Conversation list polling interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            request_timeout_ms: 15_000,
            poll_interval_ms: 20_000,
            admin_contact_limit: 200,
            max_message_length: 2000,
        }
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| Error::Settings(format!("Invalid {}={:?}: {}", key, raw, e)))
}
