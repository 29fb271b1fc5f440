//! Login, profile, logout and token refresh.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::error::AppError;
use crate::middleware::jwt::{AuthenticatedUser, JwtConfig};
use crate::models::{User, UserProfile};
use crate::response::ApiResponse;
use crate::state::AppState;

/// The login form sends the identifier in `email`; it may also be a
/// username.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Extension(jwt): Extension<JwtConfig>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_active_by_login(&request.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = bcrypt::verify(&request.password, &user.password_hash).unwrap_or(false);
    if !valid {
        return Err(AppError::Unauthorized);
    }

    if let Err(e) = state.users.touch_last_login(user.user_id).await {
        warn!("Failed to record last login for {}: {e:#}", user.user_id);
    }

    respond_with_token(&jwt, &user)
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_active_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(ApiResponse::success("Profile", UserProfile::from(&user)))
}

/// Tokens are stateless; logout just acknowledges so clients can drop theirs.
pub async fn logout() -> impl IntoResponse {
    ApiResponse::<()>::success("Successfully logged out", ())
}

pub async fn refresh(
    State(state): State<AppState>,
    Extension(jwt): Extension<JwtConfig>,
    Extension(identity): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_active_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    respond_with_token(&jwt, &user)
}

fn respond_with_token(jwt: &JwtConfig, user: &User) -> Result<Json<serde_json::Value>, AppError> {
    let token = jwt.issue(user.user_id, &user.username)?;

    Ok(Json(json!({
        "status": "success",
        "code": 200,
        "access_token": token,
        "token_type": "bearer",
        "expires_in": jwt.expires_in_secs(),
        "profile": UserProfile::from(user),
    })))
}
