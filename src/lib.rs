use axum::{
    middleware as axum_mw,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use cache::Cache;
use config::Config;
use middleware::rate_limit::RateLimiter;
use services::realtime::RealtimeHub;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub cache: Cache,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimiter,
    pub rsvp_rate_limiter: RateLimiter,
    pub realtime: RealtimeHub,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // --- Auth routes (no auth required) ---
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // --- Authenticated routes ---
    let club_routes = Router::new()
        .route(
            "/",
            post(routes::clubs::create_club).get(routes::clubs::list_my_clubs),
        )
        .route(
            "/:slug",
            get(routes::clubs::get_club).patch(routes::clubs::update_club),
        )
        .route("/:slug/members", post(routes::clubs::add_member))
        .route(
            "/:slug/members/:profileId",
            delete(routes::clubs::remove_member),
        )
        .route("/:slug/stream", get(routes::clubs::stream_club))
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ));

    let event_routes = Router::new()
        .route(
            "/",
            get(routes::events::list_events).post(routes::events::create_event),
        )
        .route("/my-rsvps", get(routes::rsvps::my_rsvps))
        .route(
            "/:id",
            get(routes::events::get_event)
                .patch(routes::events::update_event)
                .delete(routes::events::delete_event),
        )
        .route(
            "/:id/rsvp",
            post(routes::rsvps::submit_rsvp)
                .layer(axum_mw::from_fn_with_state(
                    state.clone(),
                    middleware::rate_limit::rsvp_rate_limit,
                ))
                .get(routes::rsvps::event_rsvps),
        )
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ));

    let attendance_routes = Router::new()
        .route("/monthly", get(routes::attendance::monthly))
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ));

    // --- Compose full API ---
    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/clubs", club_routes)
        .nest("/events", event_routes)
        .nest("/attendance", attendance_routes);

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(routes::health::health))
        .route("/metrics", get(routes::health::metrics))
        // Global middleware
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
