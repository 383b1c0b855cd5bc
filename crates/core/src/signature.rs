//! Signed-request verification for the storefront proxy channel.
//!
//! The platform signs forwarded requests with HMAC-SHA256 over the sorted
//! query parameters. Two canonicalizations exist:
//!
//! - **App proxy**: the `signature` field is excluded, remaining `key=value`
//!   pairs are concatenated with no separator.
//! - **OAuth callback**: the `hmac` field is excluded, remaining pairs are
//!   joined with `&`.
//!
//! Digest comparison is constant-time via [`Mac::verify_slice`].

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify an app-proxy request signature.
///
/// Returns `false` (never panics) when the secret is empty or the
/// `signature` parameter is missing.
pub fn verify_app_proxy(params: &HashMap<String, String>, secret: &str) -> bool {
    verify(params, secret, "signature", "")
}

/// Verify an OAuth callback `hmac` parameter.
pub fn verify_oauth_hmac(params: &HashMap<String, String>, secret: &str) -> bool {
    verify(params, secret, "hmac", "&")
}

fn verify(params: &HashMap<String, String>, secret: &str, sig_field: &str, separator: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Some(presented) = params.get(sig_field) else {
        return false;
    };

    // The platform renders the digest as lowercase hex; uppercase is not a
    // valid presentation even though it decodes to the same bytes.
    if presented.bytes().any(|b| b.is_ascii_uppercase()) {
        return false;
    }
    let Ok(presented_bytes) = hex::decode(presented) else {
        return false;
    };

    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .filter(|(k, _)| k.as_str() != sig_field)
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let message = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(separator);

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&presented_bytes).is_ok()
}
