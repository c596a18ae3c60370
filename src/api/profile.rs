use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::get_session_actor;
use super::{ApiError, ApiResponse, UserDto};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    /// Upload locator of a previously stored avatar image.
    pub avatar: Option<String>,
}

/// GET /profile
pub async fn get_profile(
    State(state): State<Arc<SharedState>>,
    session: Session,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let actor = get_session_actor(&session).await?;

    let user = state
        .store
        .get_user_by_username(&actor.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// PUT /profile
pub async fn update_profile(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let actor = get_session_actor(&session).await?;

    if let Some(avatar) = payload.avatar.as_deref()
        && !state.files.exists(avatar).await
    {
        return Err(ApiError::validation(format!(
            "Avatar upload not found: {avatar}"
        )));
    }

    let user = state
        .auth
        .update_profile(
            &actor.username,
            payload.display_name,
            payload.bio,
            payload.avatar,
        )
        .await?;

    Ok(Json(ApiResponse::success(user.into())))
}
