pub mod chat;

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::AppState;

/// `GET /`: service status for the site widget and uptime probes.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "Foxxy chat backend",
        "version": foxxy_core::version(),
        "booking_url": state.service.booking_url(),
    }))
}

pub async fn health() -> &'static str {
    "OK"
}
