use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::WatchlistError;

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_region() -> String {
    "US".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_host: String,
    /// Key for the RapidAPI gateway. Falls back to the RAPIDAPI_KEY env var
    /// so the secret can stay out of the config file.
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_region")]
    pub region: String,
}

impl ProviderConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("RAPIDAPI_KEY").ok().filter(|k| !k.is_empty()))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Watchlist file location. When absent the app runs on the in-memory
    /// store and forgets everything at shutdown.
    pub store_path: Option<String>,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    pub provider: ProviderConfig,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WatchlistError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            WatchlistError::Config(format!("failed to read {}: {e}", path.display()))
        })?;

        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        serde_yaml::from_str(content).map_err(|e| {
            WatchlistError::Config(format!("failed to parse {}: {e}", path.display()))
        })
    }
}
