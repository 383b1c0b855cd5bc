//! Partner carrier API client.
//!
//! Two endpoints are used:
//!
//! - `GET {base}/{alias}/catalog/products?include=skus&limit=N&page=P`:
//!   paginated product listing consumed by catalog hydration.
//! - `POST {base}/{alias}/logistics/shipping-costs`: shipping quote for a
//!   destination and cart contents.
//!
//! The [`PartnerApi`] trait is the seam the catalog synchronizer and the
//! quote pipeline call through, so both can be exercised without sockets.

pub mod error;
pub mod request;
pub mod response;

pub use error::PartnerError;
pub use request::QuoteRequest;
pub use response::ProductPage;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use shipq_core::AppConfig;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Partner API client configuration.
#[derive(Debug, Clone)]
pub struct PartnerConfig {
    /// Base URL of the partner API.
    pub base_url: String,
    /// Seller alias path segment.
    pub alias: String,
    /// Bearer token.
    pub token: String,
    /// Request timeout (default: 20s).
    pub timeout: Duration,
}

impl Default for PartnerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.partner.example".to_string(),
            alias: String::new(),
            token: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PartnerConfig {
    /// Build from the loaded application config.
    ///
    /// # Errors
    ///
    /// Returns `PartnerError::MissingToken` / `MissingAlias` when the
    /// required credentials are absent.
    pub fn from_app(config: &AppConfig) -> Result<Self, PartnerError> {
        let token = config.require_partner_token().map_err(|_| PartnerError::MissingToken)?;
        let alias = config.require_partner_alias().map_err(|_| PartnerError::MissingAlias)?;

        Ok(Self {
            base_url: config.partner_base_url.trim_end_matches('/').to_string(),
            alias: alias.to_string(),
            token: token.to_string(),
            timeout: config.timeout(),
        })
    }
}

/// The two upstream operations the core depends on.
#[async_trait]
pub trait PartnerApi: Send + Sync {
    /// Fetch one page of the product catalog with nested SKU listings.
    async fn list_products(&self, limit: u32, page: u32) -> Result<ProductPage, PartnerError>;

    /// Request a shipping quote. Returns the contents of the `data`
    /// envelope, or the raw body when the envelope is absent.
    async fn shipping_costs(&self, req: &QuoteRequest) -> Result<Value, PartnerError>;
}

/// reqwest-backed partner API client.
#[derive(Debug, Clone)]
pub struct PartnerClient {
    http: reqwest::Client,
    config: PartnerConfig,
}

impl PartnerClient {
    /// Create a new client with the given configuration.
    pub fn new(config: PartnerConfig) -> Result<Self, PartnerError> {
        if config.token.is_empty() {
            return Err(PartnerError::MissingToken);
        }
        if config.alias.is_empty() {
            return Err(PartnerError::MissingAlias);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| PartnerError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.config.base_url, self.config.alias, path)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PartnerError> {
        let status = response.status();
        if status == 401 || status == 403 {
            return Err(PartnerError::AuthError { status: status.as_u16() });
        }
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(PartnerError::HttpError { status: status.as_u16(), body });
        }
        Ok(response)
    }
}

#[async_trait]
impl PartnerApi for PartnerClient {
    async fn list_products(&self, limit: u32, page: u32) -> Result<ProductPage, PartnerError> {
        let url = self.endpoint("catalog/products");
        tracing::debug!(page, limit, "listing partner catalog page");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.token)
            .header("Accept", "application/json")
            .query(&[
                ("include", "skus".to_string()),
                ("limit", limit.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| PartnerError::Parse(e.to_string()))
    }

    async fn shipping_costs(&self, req: &QuoteRequest) -> Result<Value, PartnerError> {
        let url = self.endpoint("logistics/shipping-costs");
        tracing::debug!(zipcode = %req.zipcode, skus = req.skus_ids.len(), "requesting shipping quote");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.token)
            .header("Accept", "application/json")
            .json(req)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes).map_err(|e| PartnerError::Parse(e.to_string()))?;

        // Unwrap the `{data: ..}` envelope; older deployments answer bare.
        Ok(match body {
            Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or(Value::Null),
            other => other,
        })
    }
}
