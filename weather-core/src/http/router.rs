//! Router configuration for the HTTP API.

use axum::{Router, routing::get};
use std::path::Path;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the application router. When `static_dir` is given, every path outside
/// `/api` and `/health` is served from it.
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/weather", get(handlers::get_weather))
        .route("/history", get(handlers::get_history));

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api);

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
