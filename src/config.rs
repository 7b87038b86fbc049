//! Application configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! currently holds the API base URL.
//!
//! Configuration is stored at `~/.config/comicreader/config.json`. The
//! `COMICREADER_API_URL` environment variable overrides the configured
//! base URL without touching the file.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "comicreader";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default API base URL when neither the config file nor the environment
/// provides one.
const DEFAULT_API_BASE_URL: &str = "https://api.comicreader.example.com/api/v1";

/// Environment variable overriding the API base URL
const API_URL_ENV: &str = "COMICREADER_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve the API base URL: environment override first, then the
    /// config file, then the built-in default.
    pub fn api_base_url(&self) -> String {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                return url;
            }
        }
        self.api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for persisted client state (credential record).
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_url_defaults() {
        let config = Config::default();
        // Ignore any ambient override when asserting the fallback
        if std::env::var(API_URL_ENV).is_err() {
            assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        }
    }

    #[test]
    fn test_api_base_url_from_config() {
        if std::env::var(API_URL_ENV).is_err() {
            let config = Config {
                api_base_url: Some("http://localhost:8080/api".to_string()),
            };
            assert_eq!(config.api_base_url(), "http://localhost:8080/api");
        }
    }
}
