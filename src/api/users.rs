use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::get_session_actor;
use super::validation::{validate_role, validate_username};
use super::{ApiError, ApiResponse, MessageResponse, UserDto};
use crate::db::NewUser;
use crate::services::Role;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
}

/// GET /users: admin only.
pub async fn list_users(
    State(state): State<Arc<SharedState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let actor = get_session_actor(&session).await?;
    require_admin(&actor.role)?;

    let users = state.store.list_users().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// POST /users: admin only.
pub async fn create_user(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let actor = get_session_actor(&session).await?;

    validate_username(&payload.username)?;
    let role = validate_role(&payload.role)?;

    let user = state
        .auth
        .create_user(
            &actor,
            NewUser {
                username: payload.username,
                password: payload.password,
                role: role.as_str().to_string(),
                display_name: payload.display_name,
                bio: payload.bio,
            },
        )
        .await?;

    tracing::info!("User created: {} ({})", user.username, user.role);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user.into())),
    ))
}

/// PUT /users/{username}/password: admin only.
pub async fn reset_password(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Path(username): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let actor = get_session_actor(&session).await?;
    validate_username(&username)?;

    state
        .auth
        .reset_password(
            &actor,
            &username,
            &payload.new_password,
            &payload.confirm_password,
        )
        .await?;

    tracing::info!("Password reset for user: {username}");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password reset successfully".to_string(),
    })))
}

fn require_admin(role: &Role) -> Result<(), ApiError> {
    if *role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only admins can manage users".to_string(),
        ))
    }
}
