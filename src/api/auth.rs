//! Account and session endpoints.

use axum::{extract::State, Json};
use chrono::Duration;

use super::{success, ApiResult};
use crate::auth::{
    hash_password_blocking, validate_password, verify_password_blocking, CurrentUser,
};
use crate::errors::AppError;
use crate::models::{normalize_email, SessionResponse, SignInRequest, SignUpRequest, UserInfo};
use crate::AppState;

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// POST /api/auth/sign-up - Create an account and open a session.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> ApiResult<SessionResponse> {
    if !state.config.allow_signup {
        return Err(AppError::Forbidden("Sign-up is disabled".to_string()));
    }

    let email = normalize_email(&request.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    validate_password(&request.password)?;

    if state.repo.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("User already registered".to_string()));
    }

    let password_hash = hash_password_blocking(request.password).await?;
    let full_name = request
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let user = state
        .repo
        .create_user(&email, &password_hash, full_name)
        .await?;
    tracing::info!(user_id = %user.id, "Account created");

    let session = state
        .repo
        .create_session(&user.id, session_ttl(&state))
        .await?;

    success(SessionResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: UserInfo::from(&user),
    })
}

/// POST /api/auth/sign-in - Open a session for an existing account.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<SessionResponse> {
    validate_password(&request.password)?;

    let email = normalize_email(&request.email);
    let Some(user) = state.repo.get_user_by_email(&email).await? else {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password_blocking(request.password, user.password_hash.clone()).await? {
        tracing::info!(user_id = %user.id, "Rejected sign-in with wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let session = state
        .repo
        .create_session(&user.id, session_ttl(&state))
        .await?;
    tracing::debug!(user_id = %user.id, "Session opened");

    success(SessionResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: UserInfo::from(&user),
    })
}

/// POST /api/auth/sign-out - Close the caller's session.
pub async fn sign_out(State(state): State<AppState>, user: CurrentUser) -> ApiResult<()> {
    state.repo.delete_session(&user.token).await?;
    tracing::debug!(user_id = %user.id, "Session closed");
    success(())
}

/// GET /api/auth/session - The caller's identity.
pub async fn current_session(user: CurrentUser) -> ApiResult<UserInfo> {
    success(UserInfo {
        id: user.id,
        email: user.email,
    })
}

fn session_ttl(state: &AppState) -> Duration {
    Duration::hours(state.config.session_ttl_hours)
}
