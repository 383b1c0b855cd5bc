//! Client code for shipq.
//!
//! This crate provides the partner carrier API client, the SKU catalog
//! synchronizer, and the quote pipeline that the HTTP layer calls into.

pub mod catalog;
pub mod partner;
pub mod quote;

pub use catalog::{CatalogConfig, CatalogSync, SeedError};
pub use partner::{PartnerApi, PartnerClient, PartnerConfig, PartnerError, QuoteRequest};
pub use quote::{QuoteOptions, QuotePipeline, QuoteReply};
