use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use anyhow::{Result, anyhow};

use crate::api::DEFAULT_BASE_URL;

const API_KEY_ENV: &str = "SUPPORTCHAT_API_KEY";
const BASE_URL_ENV: &str = "SUPPORTCHAT_BASE_URL";

/// Host-supplied embedding parameters: the widget API key (required for
/// branding, optional for degraded mode) and an optional API base URL
/// override.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from the config file, then let environment variables
    /// override individual fields. Never fails: a missing or unreadable
    /// file just means defaults.
    pub fn resolve() -> Self {
        let mut settings = Self::load().unwrap_or_else(|_| Self::new());

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                settings.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.is_empty() {
                settings.base_url = Some(url);
            }
        }

        settings
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let settings: Settings = serde_json::from_str(&config_content)?;
        Ok(settings)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("supportchat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let settings = Settings::new();
        assert_eq!(settings.base_url(), DEFAULT_BASE_URL);
        assert!(settings.api_key().is_none());
    }

    #[test]
    fn test_base_url_override() {
        let settings = Settings {
            api_key: Some("wk_test".to_string()),
            base_url: Some("https://chat.example.com/api/v1".to_string()),
        };
        assert_eq!(settings.base_url(), "https://chat.example.com/api/v1");
        assert_eq!(settings.api_key(), Some("wk_test"));
    }

    #[test]
    fn test_empty_api_key_counts_as_missing() {
        let settings = Settings {
            api_key: Some(String::new()),
            base_url: None,
        };
        assert!(settings.api_key().is_none());
    }
}
