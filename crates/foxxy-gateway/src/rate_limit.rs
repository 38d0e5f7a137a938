//! Fixed-window rate limiting for `/chat`, keyed by client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use foxxy_core::{ChatError, RateLimitPolicy};
use tokio::time::Instant;

use crate::error::ApiError;
use crate::AppState;

/// Stale windows are swept once this many clients are tracked.
const SWEEP_THRESHOLD: usize = 10_000;

const RATELIMIT_LIMIT: &str = "ratelimit-limit";
const RATELIMIT_REMAINING: &str = "ratelimit-remaining";
const RATELIMIT_RESET: &str = "ratelimit-reset";

struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

impl Decision {
    /// Whole seconds until the window resets, at least 1.
    pub fn reset_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs() + u64::from(self.reset_after.subsec_nanos() > 0);
        secs.max(1)
    }
}

pub struct RateLimiter {
    policy: RateLimitPolicy,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            windows: DashMap::new(),
        }
    }

    /// Counts one request for `client` and reports whether it may proceed.
    pub fn check(&self, client: &str) -> Decision {
        let now = Instant::now();
        let window = self.policy.window;
        if self.windows.len() > SWEEP_THRESHOLD {
            self.windows
                .retain(|_, w| now.duration_since(w.started) < window);
        }

        let mut w = self
            .windows
            .entry(client.to_string())
            .or_insert_with(|| Window { started: now, count: 0 });
        if now.duration_since(w.started) >= window {
            w.started = now;
            w.count = 0;
        }
        let reset_after = window.saturating_sub(now.duration_since(w.started));
        let limit = self.policy.max_requests;

        if w.count >= limit {
            return Decision {
                allowed: false,
                limit,
                remaining: 0,
                reset_after,
            };
        }
        w.count += 1;
        Decision {
            allowed: true,
            limit,
            remaining: limit - w.count,
            reset_after,
        }
    }
}

/// Peer IP, else `unknown`. With `trust_proxy`, the first `X-Forwarded-For` hop
/// takes precedence; without it the header is client-controlled and ignored.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let forwarded = if trust_proxy {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    } else {
        None
    };
    forwarded
        .or_else(|| peer.map(|p| p.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn enforce(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(limiter) = state.limiter.as_ref() else {
        return next.run(request).await;
    };

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(request.headers(), peer, state.config.trust_proxy);
    let decision = limiter.check(&client);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!("[RATE LIMIT] {} exceeded {} requests per window", client, decision.limit);
        let err = ChatError::RateLimited {
            retry_after_secs: decision.reset_secs(),
        };
        ApiError::from_chat(&state.service, &err).into_response()
    };

    let headers = response.headers_mut();
    headers.insert(HeaderName::from_static(RATELIMIT_LIMIT), HeaderValue::from(decision.limit));
    headers.insert(HeaderName::from_static(RATELIMIT_REMAINING), HeaderValue::from(decision.remaining));
    headers.insert(HeaderName::from_static(RATELIMIT_RESET), HeaderValue::from(decision.reset_secs()));
    response
}
