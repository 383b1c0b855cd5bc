//! Axum route handlers for the quote-proxy HTTP layer.
//!
//! All request semantics live in `shipq-client`; these handlers only decode
//! query parameters and map pipeline outcomes onto HTTP responses.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use shipq_client::{CatalogSync, QuotePipeline};
use shipq_core::Error;

use crate::error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: QuotePipeline,
    pub catalog: CatalogSync,
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/proxy/shipping", get(shipping_quote))
        .route("/catalog/refresh", post(refresh_catalog))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// `GET /health` liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// `GET /proxy/shipping`: signed storefront quote request.
///
/// # Errors
/// 401 on a bad signature, 400 on malformed input or an unmapped SKU,
/// 502 when the partner API fails.
pub async fn shipping_quote(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.pipeline.handle(&params).await?;
    Ok((StatusCode::OK, Json(json!({"data": reply.data, "cached": reply.cached}))))
}

/// `POST /catalog/refresh`: manual hydration trigger. Single-flight with
/// the scheduled refresh: an overlapping call shares the in-flight scan.
///
/// # Errors
/// 500 with the hydration failure detail.
pub async fn refresh_catalog(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let written = state
        .catalog
        .hydrate()
        .await
        .map_err(|e| ApiError(Error::Hydration(e.to_string())))?;
    Ok((StatusCode::OK, Json(json!({"written": written}))))
}
