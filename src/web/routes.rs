//! Route definitions

use super::handlers;
use super::limiter;
use super::state::AppState;
use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.settings.server.allowed_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes, behind the optional rate limiter
    let api = Router::new()
        .route("/api/search", post(handlers::search))
        .route("/api/summarize", post(handlers::summarize))
        .route("/api/sources", get(handlers::sources))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            limiter::rate_limit,
        ));

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .merge(api);

    // Built frontend, with client-side routes falling back to index.html
    if let Some(ref dir) = state.settings.server.static_dir {
        info!("Serving static files from {}", dir.display());
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }

    router
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        // Add state
        .with_state(state)
}

fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return AllowOrigin::from(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    AllowOrigin::list(parsed)
}
