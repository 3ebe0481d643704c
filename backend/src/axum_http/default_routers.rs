use axum::{
    Json,
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use tracing::info;

use super::error_responses::ErrorResponse;

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    info!(path = %uri.path(), "router: no route matched");

    let body = Json(ErrorResponse {
        code: StatusCode::NOT_FOUND.as_u16(),
        error: "NOT_FOUND",
        message: format!("No route for {}", uri.path()),
    });
    (StatusCode::NOT_FOUND, body)
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
