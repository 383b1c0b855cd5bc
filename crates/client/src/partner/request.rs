//! Partner quote request body.

use serde::Serialize;

/// Body of `POST {base}/{alias}/logistics/shipping-costs`.
///
/// `skus_ids` and `quantities` are positionally aligned. `order_id` is
/// omitted from the wire when absent; the remaining fields are always
/// present (`total` and `utm_email` serialize as `null` when unset).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRequest {
    pub zipcode: String,
    pub total: Option<f64>,
    pub origin: String,
    pub utm_email: Option<String>,
    pub skus_ids: Vec<u64>,
    pub quantities: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}
