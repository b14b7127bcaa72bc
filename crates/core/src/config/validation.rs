//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `api_base_url` is not an absolute http(s) URL, or has a query or fragment
    /// - `user_agent` is empty
    /// - `timeout_ms` is set below 100ms or above 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = url::Url::parse(&self.api_base_url)
            .map_err(|e| ConfigError::Invalid { field: "api_base_url".into(), reason: e.to_string() })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "api_base_url".into(),
                reason: format!("unsupported scheme: {}", base.scheme()),
            });
        }

        if base.query().is_some() || base.fragment().is_some() {
            return Err(ConfigError::Invalid {
                field: "api_base_url".into(),
                reason: "must not carry a query string or fragment".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms < 100 {
                return Err(ConfigError::Invalid {
                    field: "timeout_ms".into(),
                    reason: "must be at least 100ms".into(),
                });
            }
            if timeout_ms > 300_000 {
                return Err(ConfigError::Invalid {
                    field: "timeout_ms".into(),
                    reason: "must not exceed 5 minutes (300000ms)".into(),
                });
            }
        }

        Ok(())
    }
}
