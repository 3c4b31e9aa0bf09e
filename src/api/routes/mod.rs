//! API routes module - organizes all route handlers.

pub mod app_state;
pub mod auth;
pub mod auth_context;
pub mod error;
pub mod images;
pub mod openapi;
pub mod problems;
pub mod solutions;

use axum::{Router, response::Json, routing::get};
use serde_json::{Value, json};

pub use app_state::AppState;

/// Create the main API router combining all route modules.
///
/// State is applied by callers (e.g. `create_app` or a TestServer).
pub fn create_api_router() -> Router<AppState> {
    let auth_limiter = crate::middleware::rate_limit::create_rate_limiter();

    Router::new()
        .nest(
            "/auth",
            auth::auth_router().layer(axum::middleware::from_fn_with_state(
                auth_limiter,
                crate::middleware::rate_limit::rate_limit_middleware,
            )),
        )
        .nest("/images", images::images_router())
        .nest("/problems", problems::problems_router())
        // OpenAPI documentation endpoints
        .merge(openapi::openapi_router())
}

/// Build the complete application: health check plus the API under /api/v1,
/// with state applied.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/health", get(health_check))
        .nest("/api/v1", create_api_router())
        .with_state(state)
}

/// GET /health - liveness probe
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
