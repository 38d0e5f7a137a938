//! `POST /chat`: body `{ "message": string, "session_id"?: string }`.
//!
//! Malformed JSON is treated as a missing message (400 with the canned reply).

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use foxxy_core::{session_key, ChatReply};

use crate::error::ApiError;
use crate::AppState;

pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ChatReply>, ApiError> {
    let payload: Option<serde_json::Value> = serde_json::from_slice(&body).ok();
    let message = payload.as_ref().and_then(|p| p.get("message"));

    let session = session_key(
        headers
            .get("x-session-id")
            .and_then(|v| v.to_str().ok())
            .or_else(|| {
                payload
                    .as_ref()
                    .and_then(|p| p.get("session_id"))
                    .and_then(|v| v.as_str())
            }),
    );

    state
        .service
        .respond(&session, message)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_chat(&state.service, &e))
}
