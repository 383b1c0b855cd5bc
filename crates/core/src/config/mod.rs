//! Application configuration with layered loading.
//!
//! Configuration is assembled from three sources:
//!
//! 1. Environment variables (SHIPQ_*)
//! 2. TOML config file (if SHIPQ_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
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
/// 1. Environment variables (SHIPQ_*)
/// 2. TOML config file (if SHIPQ_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the partner carrier API.
    #[serde(default = "default_partner_base_url")]
    pub partner_base_url: String,

    /// Seller alias segment of partner API paths
    /// (`{base}/{alias}/logistics/shipping-costs`). Required at startup.
    #[serde(default)]
    pub partner_alias: String,

    /// Partner API bearer token. Required at startup.
    #[serde(default)]
    pub partner_token: Option<String>,

    /// Shared secret for app-proxy signature verification.
    ///
    /// Required unless `verify_signature` is false.
    #[serde(default)]
    pub app_proxy_secret: Option<String>,

    /// Whether inbound proxy requests must carry a valid signature.
    #[serde(default = "default_true")]
    pub verify_signature: bool,

    /// Quote cache TTL in seconds.
    #[serde(default = "default_quote_ttl_secs")]
    pub quote_ttl_secs: u64,

    /// Interval between catalog re-hydrations, in seconds.
    #[serde(default = "default_catalog_refresh_secs")]
    pub catalog_refresh_secs: u64,

    /// Page size for the paginated catalog scan.
    #[serde(default = "default_catalog_page_limit")]
    pub catalog_page_limit: u32,

    /// Safety cap on pages per hydration, guarding against a misbehaving
    /// upstream pagination cursor.
    #[serde(default = "default_catalog_max_pages")]
    pub catalog_max_pages: u32,

    /// Optional local JSON seed for the catalog map.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,

    /// Origin code sent in every quote request body.
    #[serde(default)]
    pub origin: String,

    /// Attribution email sent in every quote request body.
    #[serde(default)]
    pub utm_email: Option<String>,

    /// Fallback order identifier for quote requests. A caller-supplied
    /// `order_id` wins; when both are absent the field is omitted upstream.
    #[serde(default)]
    pub order_id: Option<String>,

    /// HTTP request timeout in milliseconds for partner calls.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Listen address for the HTTP layer.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_partner_base_url() -> String {
    "https://api.partner.example".into()
}

fn default_quote_ttl_secs() -> u64 {
    300
}

fn default_catalog_refresh_secs() -> u64 {
    3600
}

fn default_catalog_page_limit() -> u32 {
    100
}

fn default_catalog_max_pages() -> u32 {
    200
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            partner_base_url: default_partner_base_url(),
            partner_alias: String::new(),
            partner_token: None,
            app_proxy_secret: None,
            verify_signature: true,
            quote_ttl_secs: default_quote_ttl_secs(),
            catalog_refresh_secs: default_catalog_refresh_secs(),
            catalog_page_limit: default_catalog_page_limit(),
            catalog_max_pages: default_catalog_max_pages(),
            seed_path: None,
            origin: String::new(),
            utm_email: None,
            order_id: None,
            timeout_ms: default_timeout_ms(),
            listen_addr: default_listen_addr(),
        }
    }
}

impl AppConfig {
    /// Partner-call timeout as a Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Quote cache TTL as a Duration.
    pub fn quote_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_ttl_secs)
    }

    /// Catalog refresh interval as a Duration.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.catalog_refresh_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, the environment
    /// cannot be parsed, or validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHIPQ_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHIPQ_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Partner API token, required before any upstream call can be made.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the token is not set.
    pub fn require_partner_token(&self) -> Result<&str, ConfigError> {
        self.partner_token.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "partner_token".into(),
            hint: "Set SHIPQ_PARTNER_TOKEN environment variable".into(),
        })
    }

    /// Seller alias, required to build partner API paths.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the alias is empty.
    pub fn require_partner_alias(&self) -> Result<&str, ConfigError> {
        if self.partner_alias.is_empty() {
            return Err(ConfigError::Missing {
                field: "partner_alias".into(),
                hint: "Set SHIPQ_PARTNER_ALIAS environment variable".into(),
            });
        }
        Ok(&self.partner_alias)
    }

    /// App-proxy shared secret, required when signature checks are on.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if verification is enabled and no
    /// secret is configured.
    pub fn require_proxy_secret(&self) -> Result<&str, ConfigError> {
        self.app_proxy_secret.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "app_proxy_secret".into(),
            hint: "Set SHIPQ_APP_PROXY_SECRET or disable SHIPQ_VERIFY_SIGNATURE".into(),
        })
    }
}
