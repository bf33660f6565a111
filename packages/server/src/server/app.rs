//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::BaseAuditSink;
use crate::server::routes::{
    archive_handler, bounds_search_handler, create_establishment_handler,
    get_establishment_handler, health_handler, list_own_establishments_handler,
    moderate_handler, moderation_queue_handler, radius_search_handler, submit_handler,
    suspend_handler, unsuspend_handler, update_establishment_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub audit: Arc<dyn BaseAuditSink>,
}

/// Build the axum application with all routes and middleware.
pub fn build_app(db_pool: PgPool, audit: Arc<dyn BaseAuditSink>) -> Router {
    let state = AppState { db_pool, audit };

    Router::new()
        .route("/health", get(health_handler))
        // Partner surface
        .route("/establishments", post(create_establishment_handler))
        .route(
            "/establishments/:id",
            get(get_establishment_handler).patch(update_establishment_handler),
        )
        .route("/establishments/:id/submit", post(submit_handler))
        .route("/establishments/:id/suspend", post(suspend_handler))
        .route("/establishments/:id/unsuspend", post(unsuspend_handler))
        .route("/partners/me/establishments", get(list_own_establishments_handler))
        // Moderator surface
        .route("/establishments/:id/moderate", post(moderate_handler))
        .route("/establishments/:id/archive", post(archive_handler))
        .route("/moderation/pending", get(moderation_queue_handler))
        // Consumer discovery
        .route("/search/radius", get(radius_search_handler))
        .route("/search/bounds", get(bounds_search_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
