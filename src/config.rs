use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Environment variable holding the feed credential.
pub const API_KEY_ENV: &str = "NEO_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub feed: FeedConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub base_url: String,
    pub window_days: u32,      // Days after today to include in the query
    pub timeout_seconds: u64,  // Per-request timeout
    pub retries: u32,          // Extra attempts after a failed fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>, // Prefer NEO_API_KEY over storing it here
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
    pub default_view: String, // "Dashboard" or "Charts"
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig {
                base_url: "https://api.nasa.gov/neo/rest/v1/feed".to_string(),
                window_days: 7,
                timeout_seconds: 10,
                retries: 1,
                api_key: None,
            },
            ui: UiConfig {
                tick_rate_ms: 150,
                default_view: "Dashboard".to_string(),
            },
        }
    }
}

impl Config {
    /// Loads config.toml from the working directory.
    /// If it doesn't exist, creates a default one.
    pub fn load() -> Self {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if let Ok(content) = fs::read_to_string(path) {
            match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    return Self::default();
                }
            }
        }

        let default_config = Self::default();

        // Save default config to disk for the user to edit later
        match toml::to_string_pretty(&default_config) {
            Ok(toml_string) => {
                if fs::write(path, toml_string).is_err() {
                    warn!("Could not write default {} to disk.", path.display());
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }

        info!("Loaded default configuration.");
        default_config
    }

    /// The feed credential: `NEO_API_KEY`, then `feed.api_key`.
    /// Blank values count as unset.
    pub fn api_key(&self) -> Result<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key(&self, from_env: Option<String>) -> Result<String> {
        if let Some(key) = from_env.filter(|k| !k.trim().is_empty()) {
            return Ok(key);
        }
        if let Some(key) = self.feed.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }
        Err(Error::MissingApiKey { env: API_KEY_ENV })
    }
}
