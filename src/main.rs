use std::net::SocketAddr;
use std::sync::Arc;

use matchday_api::cache::Cache;
use matchday_api::config::Config;
use matchday_api::db;
use matchday_api::middleware::rate_limit::RateLimiter;
use matchday_api::services::realtime::RealtimeHub;
use matchday_api::{build_router, AppState};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .json()
        .init();

    let pool = db::create_pool(&config).await;
    let cache = Cache::new(&config).await;
    let rate_limiter =
        RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window_secs);
    let rsvp_rate_limiter = RateLimiter::new(
        config.rate_limit.rsvp_submit_max,
        config.rate_limit.window_secs,
    );

    let port = config.port;
    let state = AppState {
        db: pool,
        cache,
        config: Arc::new(config),
        rate_limiter,
        rsvp_rate_limiter,
        realtime: RealtimeHub::new(),
    };

    tracing::info!("Matchday API initialized (Rust/Axum)");

    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("Failed to bind address");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
