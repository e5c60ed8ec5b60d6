use axum::extract::{Path, State};

use crate::database::models::user;
use crate::error::ApiError;
use crate::middleware::auth::{AuthUser, MaybeUser};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::serializers::user::{profile_response, ProfileResponse};
use crate::state::AppState;
use crate::validators::ValidationErrors;

/// GET /api/profiles/:username - Public profile with the viewer's follow flag
pub async fn get_profile(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
) -> ApiResult<ProfileResponse> {
    let target = user::find_user_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    let following = match &viewer {
        Some(viewer) => user::is_following(&state.pool, viewer.id, target.id).await?,
        None => false,
    };

    Ok(ApiResponse::success(profile_response(&target, following)))
}

/// POST /api/profiles/:username/follow - Follow an account
pub async fn follow(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(username): Path<String>,
) -> ApiResult<ProfileResponse> {
    let target = user::find_user_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    if target.id == viewer.id {
        let mut errors = ValidationErrors::new();
        errors.add("following", "can't follow yourself");
        return Err(errors.into());
    }

    user::follow(&state.pool, viewer.id, target.id).await?;
    Ok(ApiResponse::success(profile_response(&target, true)))
}

/// DELETE /api/profiles/:username/follow - Unfollow an account
pub async fn unfollow(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(username): Path<String>,
) -> ApiResult<ProfileResponse> {
    let target = user::find_user_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    user::unfollow(&state.pool, viewer.id, target.id).await?;
    Ok(ApiResponse::success(profile_response(&target, false)))
}
