//! Core types and shared functionality for shipq.
//!
//! This crate provides:
//! - TTL quote cache and canonical cache-key derivation
//! - Signed-request verification for the proxy channel
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod signature;

pub use cache::{QuoteCache, quote_cache_key};
pub use config::AppConfig;
pub use error::Error;
pub use signature::{verify_app_proxy, verify_oauth_hmac};
