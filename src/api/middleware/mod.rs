// Middleware module - CORS and rate limiting

pub mod cors;
pub mod rate_limit;

#[allow(unused_imports)]
pub use cors::create_cors_layer;
#[allow(unused_imports)]
pub use rate_limit::{RateLimiterState, create_rate_limiter, rate_limit_middleware};
