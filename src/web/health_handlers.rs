// src/web/health_handlers.rs
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

// GET /health
pub async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok", "time": Utc::now().to_rfc3339() }))
}
