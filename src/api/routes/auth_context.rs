//! Authentication context utilities.
//!
//! Extractor that turns a bearer token into the authenticated caller's
//! identity. Write operations take an [`AuthContext`] argument and trust the
//! user id it carries.

use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};
use uuid::Uuid;

use super::app_state::AppState;
use crate::services::jwt_service::JwtService;

/// Authentication context extracted from the request
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_bearer_token)
            .ok_or_else(|| {
                tracing::warn!("No authorization token provided");
                StatusCode::UNAUTHORIZED
            })?;

        let claims = state.jwt.validate_access_token(token).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

        let user_id = claims.user_id().map_err(|e| {
            tracing::warn!("JWT subject is not a user id: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

        Ok(AuthContext {
            user_id,
            email: claims.email,
        })
    }
}
