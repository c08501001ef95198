mod routes;

pub use routes::create_router;

use crate::engine::AnalogyEngine;
use crate::store::SeedCatalog;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use conceptbridge_core::BridgeError;
use serde::Serialize;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<SeedCatalog>,
    pub engine: Arc<AnalogyEngine>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(catalog: SeedCatalog, engine: AnalogyEngine) -> Self {
        Self {
            catalog: Arc::new(catalog),
            engine: Arc::new(engine),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Error body: `{"detail": "..."}`.
#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Error type for HTTP handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        let status = match &err {
            BridgeError::NotFound(_) => StatusCode::NOT_FOUND,
            BridgeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BridgeError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            BridgeError::GenerationFailed(_) => StatusCode::BAD_GATEWAY,
            BridgeError::Config(_) | BridgeError::Seed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.message())
    }
}

// Extractor rejections keep axum's status and message but use the JSON body.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_errors_map_to_statuses() {
        let cases = [
            (BridgeError::NotFound("topic 9".into()), StatusCode::NOT_FOUND),
            (BridgeError::Validation("empty".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (BridgeError::GenerationFailed("upstream".into()), StatusCode::BAD_GATEWAY),
            (BridgeError::Seed("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let api: ApiError = err.clone().into();
            assert_eq!(api.status, status, "{:?}", err);
            assert_eq!(api.detail, err.message());
        }
    }
}
