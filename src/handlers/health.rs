use axum::response::IntoResponse;

use crate::response::ApiResponse;

pub async fn health() -> impl IntoResponse {
    ApiResponse::success("OK", "pulsebox")
}
