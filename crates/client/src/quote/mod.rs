//! Quote request pipeline.
//!
//! Composes signature verification, input normalization, catalog resolution,
//! the TTL cache and the upstream quote call:
//!
//! verify → normalize → resolve → cache get → (miss) upstream → cache set.
//!
//! The catalog is read-only here; the cache is written only after a
//! successful upstream call.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use shipq_core::{AppConfig, Error, QuoteCache, quote_cache_key, verify_app_proxy};

use crate::catalog::CatalogSync;
use crate::partner::{PartnerApi, PartnerError, QuoteRequest};

/// Pipeline behavior derived from the application config.
#[derive(Debug, Clone)]
pub struct QuoteOptions {
    /// Whether inbound requests must carry a valid app-proxy signature.
    pub verify_signature: bool,
    /// Shared secret for the signature check.
    pub proxy_secret: Option<String>,
    /// Origin code forwarded in every quote body.
    pub origin: String,
    /// Attribution email forwarded in every quote body.
    pub utm_email: Option<String>,
    /// Fallback order id when the caller supplies none.
    pub order_id: Option<String>,
}

impl QuoteOptions {
    /// Build from the loaded application config.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            verify_signature: config.verify_signature,
            proxy_secret: config.app_proxy_secret.clone(),
            origin: config.origin.clone(),
            utm_email: config.utm_email.clone(),
            order_id: config.order_id.clone(),
        }
    }
}

/// Successful pipeline outcome.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteReply {
    pub data: Value,
    pub cached: bool,
}

/// The request-handling pipeline.
#[derive(Clone)]
pub struct QuotePipeline {
    partner: Arc<dyn PartnerApi>,
    catalog: CatalogSync,
    cache: QuoteCache,
    options: QuoteOptions,
}

impl QuotePipeline {
    pub fn new(partner: Arc<dyn PartnerApi>, catalog: CatalogSync, cache: QuoteCache, options: QuoteOptions) -> Self {
        Self { partner, catalog, cache, options }
    }

    /// Handle one proxied quote request.
    ///
    /// Expected parameters: `zipcode`, `skus` and `quantities` as
    /// comma-separated lists, optional `total` and `order_id`, plus the
    /// platform signature fields when verification is on.
    ///
    /// # Errors
    ///
    /// Returns the unified [`Error`] taxonomy; the thin layer maps each
    /// variant to its HTTP status.
    pub async fn handle(&self, params: &HashMap<String, String>) -> Result<QuoteReply, Error> {
        if self.options.verify_signature {
            let secret = self.options.proxy_secret.as_deref().unwrap_or("");
            if !verify_app_proxy(params, secret) {
                return Err(Error::InvalidSignature);
            }
        }

        let zipcode = normalize_zipcode(params.get("zipcode").map(String::as_str).unwrap_or(""))?;
        let skus = split_list(params.get("skus").map(String::as_str).unwrap_or(""));
        let quantities = split_list(params.get("quantities").map(String::as_str).unwrap_or(""));

        if skus.is_empty() || quantities.is_empty() {
            return Err(Error::InvalidInput("skus and quantities must be non-empty".to_string()));
        }
        if skus.len() != quantities.len() {
            return Err(Error::InvalidInput(format!(
                "got {} skus but {} quantities",
                skus.len(),
                quantities.len()
            )));
        }

        let mut skus_ids = Vec::with_capacity(skus.len());
        for code in &skus {
            skus_ids.push(self.resolve(code).await?);
        }

        let quantities = quantities
            .iter()
            .map(|q| {
                q.parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| Error::InvalidInput(format!("invalid quantity: {}", q)))
            })
            .collect::<Result<Vec<u32>, Error>>()?;

        let total = match params.get("total").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(raw) => {
                Some(raw.parse::<f64>().map_err(|_| Error::InvalidInput(format!("invalid total: {}", raw)))?)
            }
            None => None,
        };

        let key = quote_cache_key(&zipcode, &skus_ids, &quantities, total);
        if let Some(data) = self.cache.get(&key).await {
            return Ok(QuoteReply { data, cached: true });
        }

        let order_id = params
            .get("order_id")
            .filter(|s| !s.is_empty())
            .cloned()
            .or_else(|| self.options.order_id.clone());

        let request = QuoteRequest {
            zipcode,
            total,
            origin: self.options.origin.clone(),
            utm_email: self.options.utm_email.clone(),
            skus_ids,
            quantities,
            order_id,
        };

        let data = self.partner.shipping_costs(&request).await.map_err(upstream_error)?;
        let data = normalize_payload(data);

        self.cache.set(key, data.clone()).await;
        Ok(QuoteReply { data, cached: false })
    }

    /// A purely numeric code is already an internal id; anything else goes
    /// through the catalog.
    async fn resolve(&self, code: &str) -> Result<u64, Error> {
        if !code.is_empty()
            && code.bytes().all(|b| b.is_ascii_digit())
            && let Ok(id) = code.parse::<u64>()
        {
            return Ok(id);
        }
        self.catalog.lookup(code).await.ok_or_else(|| Error::UnmappedSku(code.to_string()))
    }
}

/// Strip non-digits and require exactly 8 of them.
fn normalize_zipcode(raw: &str) -> Result<String, Error> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 8 {
        return Err(Error::InvalidInput(format!("invalid postal code: {}", raw)));
    }
    Ok(digits)
}

/// Split a comma-separated list, trimming and dropping empty segments.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// The quote payload is always presented as a list; an object's values are
/// treated as the list, and a bare scalar is wrapped.
fn normalize_payload(data: Value) -> Value {
    match data {
        Value::Array(_) => data,
        Value::Object(map) => Value::Array(map.into_values().collect()),
        other => Value::Array(vec![other]),
    }
}

fn upstream_error(err: PartnerError) -> Error {
    match err {
        PartnerError::HttpError { status, body } => Error::Upstream { status, body },
        PartnerError::AuthError { status } => Error::Upstream { status, body: "authentication failed".to_string() },
        other => Error::Upstream { status: 502, body: other.to_string() },
    }
}
