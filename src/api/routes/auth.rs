//! Account routes: registration, sign-in and token refresh.
//!
//! Registration stores an Argon2id hash of the password; sign-in verifies it
//! and issues a JWT access/refresh token pair.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::app_state::AppState;
use super::error::ApiError;
use crate::models::{User, UserProfile};
use crate::services::password;
use crate::storage::error::{FieldViolation, ProblemError};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    #[schema(value_type = Object)]
    pub user: UserProfile,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    #[schema(value_type = Object)]
    pub user: UserProfile,
    #[schema(value_type = Object)]
    pub tokens: crate::services::jwt_service::TokenPair,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Create the auth router
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/signin", post(signin))
        .route("/refresh", post(refresh))
}

/// POST /auth/register - Create a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid input or email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let mut violations: Vec<FieldViolation> = Vec::new();

    let name = req.name.trim().to_string();
    if name.is_empty() {
        violations.push(FieldViolation::new("name", "is required"));
    }

    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        violations.push(FieldViolation::new("email", "is required"));
    } else if !email.contains('@') {
        violations.push(FieldViolation::new("email", "is not a valid address"));
    }

    if let Err(e) = password::validate_password_strength(&req.password, password::MIN_PASSWORD_LENGTH)
    {
        violations.push(FieldViolation::new("password", e));
    }

    if !violations.is_empty() {
        return Err(ProblemError::Validation { fields: violations }.into());
    }

    let hash = password::hash_password(&req.password)
        .map_err(|e| ProblemError::Upstream(format!("password hashing failed: {e}")))?;

    let user = state
        .store
        .insert_user(User::new(name, email, hash, req.occupation, req.dob))
        .await?;

    info!("registered user {} ({})", user.id, user.email);
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: user.profile(),
        }),
    ))
}

/// POST /auth/signin - Verify credentials and issue a token pair
#[utoipa::path(
    post,
    path = "/auth/signin",
    tag = "Auth",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = SigninResponse),
        (status = 401, description = "Unknown email or wrong password")
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<SigninResponse>, ApiError> {
    let user = state
        .store
        .get_user_by_email(&req.email)
        .await?
        .ok_or_else(|| {
            warn!("sign-in attempt for unknown email");
            ApiError::unauthorized("invalid email or password")
        })?;

    let verified = password::verify_password(&req.password, &user.password_hash)
        .map_err(|e| ProblemError::Upstream(format!("password verification failed: {e}")))?;
    if !verified {
        warn!("failed sign-in for user {}", user.id);
        return Err(ApiError::unauthorized("invalid email or password"));
    }

    let tokens = state
        .jwt
        .generate_token_pair(user.id, &user.email)
        .map_err(|e| ProblemError::Upstream(format!("token generation failed: {e}")))?;

    info!("user {} signed in", user.id);
    Ok(Json(SigninResponse {
        user: user.profile(),
        tokens,
    }))
}

/// POST /auth/refresh - Rotate an access token using a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = Object),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<crate::services::jwt_service::TokenPair>, ApiError> {
    let tokens = state
        .jwt
        .refresh_access_token(&req.refresh_token)
        .map_err(|e| {
            warn!("token refresh failed: {}", e);
            ApiError::unauthorized("invalid refresh token")
        })?;

    Ok(Json(tokens))
}
