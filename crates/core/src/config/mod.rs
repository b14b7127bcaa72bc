//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SCRAPAY_*)
//! 2. TOML config file (if SCRAPAY_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SCRAPAY_*)
/// 2. TOML config file (if SCRAPAY_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base address of the scraping API (links, extract-text, do-payment).
    ///
    /// Set via SCRAPAY_API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SCRAPAY_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional HTTP request timeout in milliseconds.
    ///
    /// Set via SCRAPAY_TIMEOUT_MS environment variable. Unset leaves the
    /// transport default in place.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_api_base_url() -> String {
    "http://localhost:3000".into()
}

fn default_user_agent() -> String {
    "scrapay/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { api_base_url: default_api_base_url(), user_agent: default_user_agent(), timeout_ms: None }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Base URL with any trailing slashes removed, ready for joining endpoint paths.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SCRAPAY_`
    /// 2. TOML file from `SCRAPAY_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SCRAPAY_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SCRAPAY_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(&figment)
    }

    /// Extract and validate configuration from an already assembled figment.
    fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        tracing::debug!(api_base_url = %config.api_base_url, "configuration loaded");

        Ok(config)
    }
}
