//! HTTP mapping of [`ChatError`]: status code plus the fixed `{ "reply": ... }` body.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use foxxy_core::{ChatError, ChatReply, ChatService, ErrorKind};

pub struct ApiError {
    status: StatusCode,
    reply: String,
    retry_after_secs: Option<u64>,
}

impl ApiError {
    pub fn from_chat(service: &ChatService, err: &ChatError) -> Self {
        let retry_after_secs = match err {
            ChatError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        if err.is_transient() {
            tracing::warn!("[HTTP] Request failed, client may retry: {}", err);
        } else {
            tracing::debug!("[HTTP] Request failed: {}", err);
        }
        Self {
            status: status_for(err),
            reply: service.error_reply(err).to_string(),
            retry_after_secs,
        }
    }
}

pub fn status_for(err: &ChatError) -> StatusCode {
    match err.kind() {
        ErrorKind::ClientInput => StatusCode::BAD_REQUEST,
        ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorKind::RateLimit => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Configuration | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(ChatReply::text(self.reply))).into_response();
        if let Some(secs) = self.retry_after_secs {
            if let Ok(v) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, v);
            }
        }
        response
    }
}
