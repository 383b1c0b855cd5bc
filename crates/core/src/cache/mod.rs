//! In-memory TTL cache for computed shipping quotes.
//!
//! Entries are stamped at insertion and considered dead once older than the
//! configured TTL. Expiry is lazy: a dead entry is evicted by the read that
//! finds it, not by a background sweep. [`QuoteCache::purge_expired`] exists
//! for callers that want one anyway.

pub mod key;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

pub use key::quote_cache_key;

struct CachedQuote {
    payload: Value,
    stored_at: Instant,
}

impl CachedQuote {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }
}

/// Time-bounded memo of quote payloads keyed by the canonical request key.
#[derive(Clone)]
pub struct QuoteCache {
    entries: Arc<RwLock<HashMap<String, CachedQuote>>>,
    ttl: Duration,
}

impl QuoteCache {
    /// Create a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    /// Look up a payload, evicting it if its TTL has elapsed.
    pub async fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(self.ttl) => {
                    tracing::debug!(key, "quote cache hit");
                    return Some(entry.payload.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Found but dead; evict under the write lock, re-checking in case a
        // writer replaced it while we upgraded.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key)
            && entry.is_expired(self.ttl)
        {
            entries.remove(key);
        }
        None
    }

    /// Store a payload, unconditionally replacing any prior entry.
    pub async fn set(&self, key: String, payload: Value) {
        let mut entries = self.entries.write().await;
        entries.insert(key, CachedQuote { payload, stored_at: Instant::now() });
    }

    /// Drop every expired entry. Nothing schedules this; the lazy contract
    /// in [`QuoteCache::get`] stands on its own.
    pub async fn purge_expired(&self) {
        let ttl = self.ttl;
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired(ttl));
    }

    /// Number of entries currently held, dead or alive.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(300);

    async fn backdate(cache: &QuoteCache, key: &str, age: Duration) {
        let mut entries = cache.entries.write().await;
        let entry = entries.get_mut(key).unwrap();
        entry.stored_at = Instant::now() - age;
    }

    #[tokio::test]
    async fn test_round_trip_within_ttl() {
        let cache = QuoteCache::new(TTL);
        let payload = json!([{"price": 12.5, "service": "express"}]);
        cache.set("k1".to_string(), payload.clone()).await;
        assert_eq!(cache.get("k1").await, Some(payload));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = QuoteCache::new(TTL);
        assert_eq!(cache.get("nope").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_absent_and_evicted() {
        let cache = QuoteCache::new(TTL);
        cache.set("k1".to_string(), json!({"price": 1})).await;
        backdate(&cache, "k1", TTL + Duration::from_secs(1)).await;

        assert_eq!(cache.get("k1").await, None);
        assert_eq!(cache.len().await, 0, "dead entry is evicted by the read");
    }

    #[tokio::test]
    async fn test_set_overwrites_wholesale() {
        let cache = QuoteCache::new(TTL);
        cache.set("k1".to_string(), json!({"price": 1})).await;
        backdate(&cache, "k1", TTL - Duration::from_secs(1)).await;

        cache.set("k1".to_string(), json!({"price": 2})).await;
        assert_eq!(cache.get("k1").await, Some(json!({"price": 2})));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = QuoteCache::new(TTL);
        cache.set("dead".to_string(), json!(1)).await;
        cache.set("alive".to_string(), json!(2)).await;
        backdate(&cache, "dead", TTL + Duration::from_secs(1)).await;

        cache.purge_expired().await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("alive").await, Some(json!(2)));
    }
}
