//! Partner API response types.

use serde::Deserialize;

/// One page of `GET {base}/{alias}/catalog/products?include=skus`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub data: Vec<Product>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl ProductPage {
    /// Upstream-reported page count, if the envelope carried one.
    pub fn total_pages(&self) -> Option<u32> {
        self.meta.as_ref()?.pagination.as_ref()?.total_pages
    }
}

/// A product with its nested SKU listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub skus: SkuListing,
}

/// Nested SKU listing: either wrapped in a `{data: [..]}` envelope or flat.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkuListing {
    Wrapped { data: Vec<SkuRecord> },
    Flat(Vec<SkuRecord>),
}

impl Default for SkuListing {
    fn default() -> Self {
        SkuListing::Flat(Vec::new())
    }
}

impl SkuListing {
    pub fn records(&self) -> &[SkuRecord] {
        match self {
            SkuListing::Wrapped { data } => data,
            SkuListing::Flat(data) => data,
        }
    }
}

/// One SKU record; either field may be missing or null upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct SkuRecord {
    #[serde(default, alias = "code")]
    pub sku: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
}

/// Pagination metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total_pages: Option<u32>,
}
