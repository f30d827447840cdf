//! Tempo Router
//!
//! HTTP router configuration with middleware stack. Defines all API routes
//! and applies cross-cutting concerns like request tracing and CORS.
//!
//! @version 0.1.0
//! @author Tempo Development Team

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// =============================================================================
// Router
// =============================================================================

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let enable_cors = state.config.enable_cors;

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/timeseries", post(handlers::create_series))
        .route("/timeseries", get(handlers::list_series))
        .route("/timeseries/:id", get(handlers::get_series))
        .route("/timeseries/:id", put(handlers::update_series))
        .route("/timeseries/:id", delete(handlers::delete_series))
        .route("/timeseries/:id/data", post(handlers::append_points))
        .route("/timeseries/:id/data", get(handlers::query_points))
        .route("/timeseries/:id/data/:point_id", get(handlers::get_point))
        .route("/timeseries/:id/data/:point_id", patch(handlers::update_point))
        .route("/timeseries/:id/data/:point_id", delete(handlers::delete_point))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
}
