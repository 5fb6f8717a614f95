use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

/// REST endpoints. Pages live on another origin, so CORS is open.
pub fn api_router(state: AppState) -> Router {
    let upload_limit = state.config.upload_limit;
    Router::new()
        .route("/", get(handlers::home))
        .route("/api/health", get(handlers::health))
        .route("/api/entries", get(handlers::list_entries))
        .route("/api/current-logs", get(handlers::list_current_logs))
        .route("/api/previous-logs", get(handlers::list_previous_logs))
        .route("/api/slots", get(handlers::list_slots))
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/text", post(handlers::submit_text))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The three browser pages.
pub fn web_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home_page))
        .route("/upload", get(handlers::upload_page))
        .route("/dashboard", get(handlers::dashboard_page))
        .with_state(state)
}
