//! CORS middleware configuration.

use tower_http::cors::CorsLayer;

/// Create a CORS layer with permissive settings for development.
///
/// This allows all origins, methods, and headers. For production,
/// you should configure more restrictive CORS settings.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Create a CORS layer restricted to the given origins.
#[allow(dead_code)]
pub fn create_custom_cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    use tower_http::cors::AllowOrigin;

    CorsLayer::new().allow_origin(AllowOrigin::list(
        allowed_origins.iter().filter_map(|s| s.parse().ok()),
    ))
}
