//! Session-based authentication.
//!
//! The session layer resolves a bearer token into a [`CurrentUser`] and
//! stores it in the request extensions; handlers receive it as an extractor.

mod password;

pub use password::*;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::AppState;

/// Header carrying the session token when no `Authorization` header is sent.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    /// Token of the session that authenticated this request.
    pub token: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Pull the session token from `Authorization: Bearer` or `x-session-token`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    bearer
        .or_else(|| {
            headers
                .get(SESSION_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Session middleware: rejects the request unless it carries a live session.
pub async fn session_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers()) else {
        return AppError::Unauthorized("Missing session token".to_string()).into_response();
    };

    let session = match state.repo.get_session(&token).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            return AppError::Unauthorized("Invalid or expired session".to_string())
                .into_response()
        }
        Err(e) => return e.into_response(),
    };

    let user = match state.repo.get_user(&session.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(user_id = %session.user_id, "Session refers to a missing user");
            return AppError::Unauthorized("Invalid or expired session".to_string())
                .into_response();
        }
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        token: session.token,
    });

    next.run(request).await
}
