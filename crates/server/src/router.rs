use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let body_limit = app_state.config.max_body_bytes;
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route(
            "/api/generate-metadata",
            post(handlers::generate_metadata_handler).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
