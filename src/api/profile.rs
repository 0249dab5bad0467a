//! Profile endpoints.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::auth::CurrentUser;
use crate::models::{Profile, UpdateProfileRequest};
use crate::AppState;

/// GET /api/profile - The caller's profile, empty when none is stored.
pub async fn get_profile(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Profile> {
    let profile = state
        .repo
        .get_profile(&user.id)
        .await?
        .unwrap_or_else(|| Profile::empty(&user.id));

    success(profile)
}

/// PUT /api/profile - Replace the caller's profile.
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Profile> {
    let profile = state
        .repo
        .upsert_profile(&user.id, &request.normalized())
        .await?;
    tracing::info!(user_id = %user.id, "Profile updated");

    success(profile)
}
