use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// HTTP-boundary errors: validation failures (400), not-found (404), and
/// store failures (500). Never constructed from a `panic!`/`unwrap()`.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound,
    Store(baseidx_store::StoreError),
}

impl From<baseidx_store::StoreError> for ApiError {
    fn from(err: baseidx_store::StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "account not found".to_string()),
            ApiError::Store(err) => {
                tracing::error!(%err, "store error at the HTTP boundary");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
