//! Error types for the HTTP layer.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Wrapper turning the unified pipeline error into an HTTP response.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub shipq_core::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipq_core::Error;

    #[test]
    fn api_error_status_codes_map_correctly() {
        let resp = ApiError(Error::InvalidSignature).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = ApiError(Error::InvalidInput("bad postal code".to_owned())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError(Error::Upstream { status: 500, body: "boom".to_owned() }).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = ApiError(Error::Hydration("boom".to_owned())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
