//! shipq server entry point.
//!
//! Thin HTTP layer over the quote pipeline: loads configuration, seeds and
//! hydrates the SKU catalog, and serves the proxy routes until shutdown.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use shipq_client::{CatalogConfig, CatalogSync, PartnerClient, PartnerConfig, QuoteOptions, QuotePipeline};
use shipq_core::{AppConfig, QuoteCache};

mod error;
mod routes;

use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Missing partner credentials abort startup here.
    let config = AppConfig::load()?;
    let partner = Arc::new(PartnerClient::new(PartnerConfig::from_app(&config)?)?);

    let catalog = CatalogSync::new(partner.clone(), CatalogConfig::from_app(&config));

    if let Some(path) = &config.seed_path {
        match catalog.load_seed(path).await {
            Ok(written) => tracing::info!(written, "catalog seed loaded"),
            Err(e) => tracing::warn!(error = %e, "catalog seed skipped"),
        }
    }

    // First hydration runs off the startup path so a slow upstream does not
    // delay the listener; numeric codes and seeded SKUs work meanwhile.
    {
        let catalog = catalog.clone();
        tokio::spawn(async move {
            match catalog.hydrate().await {
                Ok(written) => tracing::info!(written, "initial catalog hydration"),
                Err(e) => tracing::warn!(error = %e, "initial catalog hydration failed"),
            }
        });
    }
    catalog.start_auto_refresh().await;

    let pipeline = QuotePipeline::new(
        partner,
        catalog.clone(),
        QuoteCache::new(config.quote_ttl()),
        QuoteOptions::from_app(&config),
    );
    let app = routes::create_router(AppState { pipeline, catalog: catalog.clone() });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "shipq listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    catalog.stop_auto_refresh().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
