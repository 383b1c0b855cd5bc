//! Configuration validation rules.
//!
//! Applied to `AppConfig` values after they have been loaded from
//! environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `quote_ttl_secs` is 0
    /// - `catalog_refresh_secs` is 0
    /// - `catalog_page_limit` is 0 or exceeds 250
    /// - `catalog_max_pages` is 0
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quote_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "quote_ttl_secs".into(), reason: "must be greater than 0".into() });
        }

        if self.catalog_refresh_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "catalog_refresh_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.catalog_page_limit == 0 || self.catalog_page_limit > 250 {
            return Err(ConfigError::Invalid {
                field: "catalog_page_limit".into(),
                reason: "must be between 1 and 250".into(),
            });
        }

        if self.catalog_max_pages == 0 {
            return Err(ConfigError::Invalid {
                field: "catalog_max_pages".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.verify_signature && self.app_proxy_secret.is_none() {
            tracing::warn!(
                "verify_signature is on but app_proxy_secret is unset; \
                 every proxy request will be rejected until one is configured"
            );
        }

        Ok(())
    }
}
