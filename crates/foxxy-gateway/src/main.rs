//! Foxxy Gateway: HTTP front of the Spitfox chat assistant.
//! `GET /` status, `GET /health`, `POST /chat`. Groq behind the Model Gateway.

mod error;
mod handlers;
mod rate_limit;
mod security;

use axum::{
    body::Body,
    extract::{ConnectInfo, DefaultBodyLimit, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use foxxy_core::{
    api_key_from_env, ChatProvider, ChatService, Content, OpenAiCompatibleProvider, ServerConfig,
    ServiceOptions,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::rate_limit::RateLimiter;

pub struct AppState {
    pub service: ChatService,
    pub limiter: Option<RateLimiter>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        content: Content,
        provider: Arc<dyn ChatProvider>,
        options: ServiceOptions,
    ) -> Self {
        let limiter = options.limits.rate_limit.map(RateLimiter::new);
        Self {
            service: ChatService::new(content, provider, options),
            limiter,
            config,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[foxxy-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("[FOXXY] Gateway stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ServerConfig::load()?;
    let content = Content::load(config.content_path.as_deref())?;
    let provider: Arc<dyn ChatProvider> = Arc::new(OpenAiCompatibleProvider::new(
        config.provider_url.clone(),
        config.model.clone(),
    )?);
    let options = ServiceOptions::from_config(&config, api_key_from_env());
    let addr = config.bind_addr();
    tracing::info!(
        "[FOXXY] Profile: {} | model {} | upstream timeout {:?}",
        if config.hardened { "hardened" } else { "simple" },
        config.model,
        config.upstream_timeout()
    );

    let state = Arc::new(AppState::new(config, content, provider, options));
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("[FOXXY] Secure Foxxy running on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

fn build_app(state: Arc<AppState>) -> Router {
    let limits = *state.service.limits();
    let cors = security::cors_layer(limits.restrict_origin, &state.config.allowed_origin);

    Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ))
        .route("/", get(handlers::status))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(limits.body_limit_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security::security_headers,
        ))
        .layer(cors)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

async fn log_requests(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = rate_limit::client_key(request.headers(), peer, state.config.trust_proxy);
    let started = Instant::now();

    let response = next.run(request).await;
    tracing::info!(
        "[HTTP] {} {} from {} -> {} ({} ms)",
        method,
        path,
        client,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("[FOXXY] Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("[FOXXY] Shutting down");
}
