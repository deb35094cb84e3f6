//! HTTP pass-through endpoints for FROG stats and the SEI price

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use ethers::types::Address;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use super::cache::TtlCache;
use super::upstream::{PriceFeed, SeiPrice, TokenStats};

pub const STATS_TTL: Duration = Duration::from_secs(30);
pub const SEI_PRICE_TTL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct PriceState {
    feed: Arc<dyn PriceFeed>,
    frog: Address,
    stats: Arc<TtlCache<TokenStats>>,
    sei: Arc<TtlCache<SeiPrice>>,
}

impl PriceState {
    pub fn new(feed: Arc<dyn PriceFeed>, frog: Address) -> Self {
        Self {
            feed,
            frog,
            stats: Arc::new(TtlCache::new(STATS_TTL)),
            sei: Arc::new(TtlCache::new(SEI_PRICE_TTL)),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// `public, s-maxage=<ttl>, stale-while-revalidate=<2*ttl>`
pub fn cache_control(ttl: Duration) -> HeaderValue {
    let secs = ttl.as_secs();
    HeaderValue::from_str(&format!(
        "public, s-maxage={}, stale-while-revalidate={}",
        secs,
        secs * 2
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}

fn upstream_failure(what: &str, e: impl std::fmt::Display) -> Response {
    tracing::warn!("{} upstream failed: {}", what, e);
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorBody {
            error: format!("{} unavailable", what),
        }),
    )
        .into_response()
}

/// GET /api/frog-stats
pub async fn frog_stats(State(state): State<PriceState>) -> Response {
    let feed = state.feed.clone();
    let frog = state.frog;
    match state.stats.get_or_fetch(|| async move { feed.token_stats(frog).await }).await {
        Ok(stats) => (
            [(header::CACHE_CONTROL, cache_control(state.stats.ttl()))],
            Json(stats),
        )
            .into_response(),
        Err(e) => upstream_failure("FROG stats", e),
    }
}

/// GET /api/sei-price
pub async fn sei_price(State(state): State<PriceState>) -> Response {
    let feed = state.feed.clone();
    match state.sei.get_or_fetch(|| async move { feed.sei_price().await }).await {
        Ok(price) => (
            [(header::CACHE_CONTROL, cache_control(state.sei.ttl()))],
            Json(price),
        )
            .into_response(),
        Err(e) => upstream_failure("SEI price", e),
    }
}

pub fn create_router(state: PriceState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/frog-stats", get(frog_stats))
        .route("/api/sei-price", get(sei_price))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(state: PriceState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = create_router(state);

    tracing::info!("Starting price proxy on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
