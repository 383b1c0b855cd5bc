//! SKU-to-internal-id catalog synchronizer.
//!
//! Maintains a process-wide map from storefront SKU codes to the partner
//! carrier's numeric ids. The map is optionally seeded from a local JSON
//! file, then hydrated from the paginated partner catalog listing, and
//! re-hydrated on a fixed interval for the life of the process.
//!
//! Every entry is written under three keys (trimmed, upper-cased and
//! lower-cased) so lookups are case-insensitive. Writes are last-write-wins
//! and the map only ever gains entries: a failed hydration leaves everything
//! written so far intact.
//!
//! Hydration is single-flight: one scan in flight at a time, and a caller
//! that waited out a successful concurrent scan shares its result instead of
//! starting another.

pub mod seed;

pub use seed::SeedError;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::partner::{PartnerApi, PartnerError};
use shipq_core::AppConfig;

/// Catalog synchronizer tuning.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Page size for the catalog scan.
    pub page_limit: u32,
    /// Safety cap on pages per scan.
    pub max_pages: u32,
    /// Interval between scheduled re-hydrations.
    pub refresh_interval: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { page_limit: 100, max_pages: 200, refresh_interval: Duration::from_secs(3600) }
    }
}

impl CatalogConfig {
    /// Build from the loaded application config.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            page_limit: config.catalog_page_limit,
            max_pages: config.catalog_max_pages,
            refresh_interval: config.refresh_interval(),
        }
    }
}

/// Shared SKU catalog with background refresh.
#[derive(Clone)]
pub struct CatalogSync {
    entries: Arc<RwLock<HashMap<String, u64>>>,
    partner: Arc<dyn PartnerApi>,
    config: CatalogConfig,
    hydration: Arc<Mutex<()>>,
    generation: Arc<AtomicU64>,
    last_count: Arc<AtomicUsize>,
    refresh_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl CatalogSync {
    /// Create an empty catalog backed by the given partner API.
    pub fn new(partner: Arc<dyn PartnerApi>, config: CatalogConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            partner,
            config,
            hydration: Arc::new(Mutex::new(())),
            generation: Arc::new(AtomicU64::new(0)),
            last_count: Arc::new(AtomicUsize::new(0)),
            refresh_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Resolve a SKU code to its internal id: exact match first, then the
    /// upper- and lower-cased forms of the trimmed input.
    pub async fn lookup(&self, code: &str) -> Option<u64> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }

        let entries = self.entries.read().await;
        if let Some(&id) = entries.get(code) {
            return Some(id);
        }
        if let Some(&id) = entries.get(&code.to_uppercase()) {
            return Some(id);
        }
        entries.get(&code.to_lowercase()).copied()
    }

    /// One-shot bulk load from a local seed file.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the file is unreadable or malformed; the
    /// caller is expected to log and continue.
    pub async fn load_seed(&self, path: &Path) -> Result<usize, SeedError> {
        let records = seed::read_seed(path)?;
        let mut entries = self.entries.write().await;
        let mut written = 0;
        for (code, id) in records {
            if write_entry(&mut entries, &code, id) {
                written += 1;
            }
        }
        tracing::info!(written, path = %path.display(), "catalog seeded");
        Ok(written)
    }

    /// Full paginated catalog scan. Returns the number of SKU records
    /// written (each record lands under its three normalized keys).
    ///
    /// # Errors
    ///
    /// A page failure aborts the attempt and propagates, but entries
    /// written from earlier pages remain in the map.
    pub async fn hydrate(&self) -> Result<usize, PartnerError> {
        let seen = self.generation.load(Ordering::Acquire);
        let _guard = self.hydration.lock().await;
        if self.generation.load(Ordering::Acquire) != seen {
            // A concurrent scan completed while we waited for the lock.
            return Ok(self.last_count.load(Ordering::Acquire));
        }

        let written = self.scan_catalog().await?;
        self.last_count.store(written, Ordering::Release);
        self.generation.fetch_add(1, Ordering::Release);
        Ok(written)
    }

    async fn scan_catalog(&self) -> Result<usize, PartnerError> {
        let mut written = 0usize;
        let mut page = 1u32;

        loop {
            let listing = self.partner.list_products(self.config.page_limit, page).await?;
            if listing.data.is_empty() {
                break;
            }

            {
                let mut entries = self.entries.write().await;
                for product in &listing.data {
                    for record in product.skus.records() {
                        if let (Some(code), Some(id)) = (record.sku.as_deref(), record.id)
                            && write_entry(&mut entries, code, id)
                        {
                            written += 1;
                        }
                    }
                }
            }

            if let Some(total) = listing.total_pages()
                && page >= total
            {
                break;
            }
            if page >= self.config.max_pages {
                tracing::warn!(page, cap = self.config.max_pages, "catalog page cap reached, stopping scan");
                break;
            }
            page += 1;
        }

        tracing::info!(written, pages = page, "catalog hydration complete");
        Ok(written)
    }

    /// Start the self-rescheduling refresh task: sleep, hydrate, repeat.
    /// A slow scan delays the next tick rather than overlapping it, and
    /// failures are logged and swallowed so the schedule continues.
    pub async fn start_auto_refresh(&self) {
        let mut slot = self.refresh_task.lock().await;
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        let sync = self.clone();
        let interval = self.config.refresh_interval;
        *slot = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                match sync.hydrate().await {
                    Ok(written) => tracing::info!(written, "scheduled catalog refresh"),
                    Err(e) => tracing::warn!(error = %e, "scheduled catalog refresh failed"),
                }
            }
        }));
    }

    /// Cancel the pending scheduled refresh, if any.
    pub async fn stop_auto_refresh(&self) {
        if let Some(handle) = self.refresh_task.lock().await.take() {
            handle.abort();
        }
    }

    /// Number of keys currently in the map (three per entry).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Write one entry under its trimmed, upper and lower keys. Blank codes and
/// non-positive ids are skipped.
fn write_entry(entries: &mut HashMap<String, u64>, code: &str, id: u64) -> bool {
    let code = code.trim();
    if code.is_empty() || id == 0 {
        return false;
    }
    entries.insert(code.to_string(), id);
    entries.insert(code.to_uppercase(), id);
    entries.insert(code.to_lowercase(), id);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partner::request::QuoteRequest;
    use crate::partner::response::{Product, ProductPage, SkuListing, SkuRecord};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::AtomicUsize;

    /// Scripted partner stub: one slot per page, `None` means that page
    /// fails. Pages past the script are empty.
    struct StubPartner {
        pages: Vec<Option<ProductPage>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl StubPartner {
        fn new(pages: Vec<Option<ProductPage>>) -> Self {
            Self { pages, calls: AtomicUsize::new(0), delay: Duration::ZERO }
        }
    }

    #[async_trait]
    impl PartnerApi for StubPartner {
        async fn list_products(&self, _limit: u32, page: u32) -> Result<ProductPage, PartnerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.pages.get((page - 1) as usize) {
                Some(Some(p)) => Ok(p.clone()),
                Some(None) => Err(PartnerError::HttpError { status: 500, body: "boom".to_string() }),
                None => Ok(ProductPage { data: Vec::new(), meta: None }),
            }
        }

        async fn shipping_costs(&self, _req: &QuoteRequest) -> Result<Value, PartnerError> {
            Err(PartnerError::HttpError { status: 500, body: "unexpected quote call".to_string() })
        }
    }

    fn page_of(skus: &[(&str, u64)], total_pages: Option<u32>) -> ProductPage {
        let records = skus
            .iter()
            .map(|(code, id)| SkuRecord { sku: Some((*code).to_string()), id: Some(*id) })
            .collect();
        let meta = total_pages.map(|n| {
            serde_json::from_value(serde_json::json!({"pagination": {"total_pages": n}})).unwrap()
        });
        ProductPage { data: vec![Product { skus: SkuListing::Flat(records) }], meta }
    }

    fn catalog(stub: Arc<StubPartner>, config: CatalogConfig) -> CatalogSync {
        CatalogSync::new(stub, config)
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive_and_trims() {
        let stub = Arc::new(StubPartner::new(vec![Some(page_of(&[("ABC-1", 42)], Some(1)))]));
        let sync = catalog(stub, CatalogConfig::default());
        sync.hydrate().await.unwrap();

        assert_eq!(sync.lookup("ABC-1").await, Some(42));
        assert_eq!(sync.lookup("abc-1").await, Some(42));
        assert_eq!(sync.lookup(" Abc-1 ").await, Some(42));
        assert_eq!(sync.lookup("missing").await, None);
        assert_eq!(sync.lookup("   ").await, None);
    }

    #[tokio::test]
    async fn test_hydrate_stops_at_reported_total_pages() {
        let stub = Arc::new(StubPartner::new(vec![
            Some(page_of(&[("A", 1)], Some(2))),
            Some(page_of(&[("B", 2)], Some(2))),
            Some(page_of(&[("C", 3)], Some(2))),
        ]));
        let sync = catalog(stub.clone(), CatalogConfig::default());

        let written = sync.hydrate().await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
        assert_eq!(sync.lookup("C").await, None);
    }

    #[tokio::test]
    async fn test_hydrate_stops_on_empty_page() {
        let stub = Arc::new(StubPartner::new(vec![Some(page_of(&[("A", 1)], None))]));
        let sync = catalog(stub.clone(), CatalogConfig::default());

        sync.hydrate().await.unwrap();
        // page 2 came back empty and terminated the scan
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_hydrate_respects_page_cap() {
        let pages: Vec<Option<ProductPage>> =
            (0..10u64).map(|i| Some(page_of(&[(format!("P{}", i).as_str(), i + 1)], None))).collect();
        let stub = Arc::new(StubPartner::new(pages));
        let config = CatalogConfig { max_pages: 3, ..Default::default() };
        let sync = catalog(stub.clone(), config);

        sync.hydrate().await.unwrap();
        assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_earlier_entries() {
        let stub = Arc::new(StubPartner::new(vec![Some(page_of(&[("A", 1)], Some(3))), None]));
        let sync = catalog(stub, CatalogConfig::default());

        let result = sync.hydrate().await;
        assert!(matches!(result, Err(PartnerError::HttpError { status: 500, .. })));
        assert_eq!(sync.lookup("A").await, Some(1), "page-1 entries survive a page-2 failure");
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let stub = Arc::new(StubPartner::new(vec![
            Some(page_of(&[("A", 1)], Some(2))),
            Some(page_of(&[("A", 7)], Some(2))),
        ]));
        let sync = catalog(stub, CatalogConfig::default());
        sync.hydrate().await.unwrap();
        assert_eq!(sync.lookup("A").await, Some(7));
    }

    #[tokio::test]
    async fn test_skips_blank_codes_and_zero_ids() {
        let page = ProductPage {
            data: vec![Product {
                skus: SkuListing::Flat(vec![
                    SkuRecord { sku: Some("  ".to_string()), id: Some(5) },
                    SkuRecord { sku: Some("OK".to_string()), id: Some(0) },
                    SkuRecord { sku: None, id: Some(5) },
                    SkuRecord { sku: Some("GOOD".to_string()), id: None },
                    SkuRecord { sku: Some("KEPT".to_string()), id: Some(5) },
                ]),
            }],
            meta: None,
        };
        let stub = Arc::new(StubPartner::new(vec![Some(page)]));
        let sync = catalog(stub.clone(), CatalogConfig::default());

        let written = sync.hydrate().await.unwrap();
        assert_eq!(written, 1);
        assert_eq!(sync.lookup("KEPT").await, Some(5));
        assert_eq!(sync.lookup("OK").await, None);
        assert_eq!(sync.lookup("GOOD").await, None);
        // a page carrying products, even unusable ones, does not end the
        // scan; the empty page 2 does
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_seed_then_lookup() {
        let path = std::env::temp_dir().join(format!("shipq-catalog-seed-{}.json", std::process::id()));
        std::fs::write(&path, r#"[{"code": "SKU1", "id": 501}]"#).unwrap();

        let stub = Arc::new(StubPartner::new(vec![]));
        let sync = catalog(stub, CatalogConfig::default());
        let written = sync.load_seed(&path).await.unwrap();

        assert_eq!(written, 1);
        assert_eq!(sync.lookup("sku1").await, Some(501));
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_seed_missing_file_is_err_not_panic() {
        let stub = Arc::new(StubPartner::new(vec![]));
        let sync = catalog(stub, CatalogConfig::default());
        assert!(sync.load_seed(Path::new("/nonexistent/seed.json")).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_hydration_is_single_flight() {
        let mut stub = StubPartner::new(vec![Some(page_of(&[("A", 1)], Some(1)))]);
        stub.delay = Duration::from_millis(50);
        let stub = Arc::new(stub);
        let sync = catalog(stub.clone(), CatalogConfig::default());

        let first = sync.clone();
        let second = sync.clone();
        let (a, b) = tokio::join!(first.hydrate(), async move {
            // let the first scan take the lock
            tokio::time::sleep(Duration::from_millis(10)).await;
            second.hydrate().await
        });

        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 1, "waiter shares the completed scan's count");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1, "only one scan hit the upstream");
    }

    #[tokio::test]
    async fn test_auto_refresh_swallows_failures_and_continues() {
        let stub = Arc::new(StubPartner::new(vec![None]));
        let config = CatalogConfig { refresh_interval: Duration::from_millis(20), ..Default::default() };
        let sync = catalog(stub.clone(), config);

        sync.start_auto_refresh().await;
        tokio::time::sleep(Duration::from_millis(90)).await;
        sync.stop_auto_refresh().await;

        assert!(stub.calls.load(Ordering::SeqCst) >= 2, "schedule continues past failures");
    }

    #[tokio::test]
    async fn test_stop_auto_refresh_cancels_pending_run() {
        let stub = Arc::new(StubPartner::new(vec![Some(page_of(&[("A", 1)], Some(1)))]));
        let config = CatalogConfig { refresh_interval: Duration::from_millis(20), ..Default::default() };
        let sync = catalog(stub.clone(), config);

        sync.start_auto_refresh().await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        sync.stop_auto_refresh().await;

        let calls = stub.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), calls, "no ticks after stop");
    }
}
