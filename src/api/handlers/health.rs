/*
 * Responsibility
 * - GET /health (疎通用)
 * - gate の外側にあるので locale redirect も認証も通らない
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
