use axum::{http::StatusCode, response::Json};
use serde_json::json;

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": "GreenPulse India API is running!" }))
}

pub async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
