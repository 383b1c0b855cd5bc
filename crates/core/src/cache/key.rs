//! Canonical cache-key derivation for quote lookups.

use sha2::{Digest, Sha256};

/// Compute the cache key for a normalized quote request.
///
/// The key is a SHA-256 hash over a canonical JSON object; serde_json sorts
/// map keys, so any two logically-identical requests serialize identically.
/// Array order is preserved: ids and quantities are positionally paired, and
/// permuting them produces a different key.
pub fn quote_cache_key(zipcode: &str, skus_ids: &[u64], quantities: &[u32], total: Option<f64>) -> String {
    let params = serde_json::json!({
        "zipcode": zipcode,
        "skus_ids": skus_ids,
        "quantities": quantities,
        "total": total,
    });

    let mut hasher = Sha256::new();
    hasher.update(params.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
