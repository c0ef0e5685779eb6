use axum::response::Json;
use chrono::Utc;
use serde_json::{Value, json};

/// Liveness probe shared by the callback server and the JSON API.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "time": Utc::now().to_rfc3339(),
    }))
}
