use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, MessageResponse, UserDto};
use crate::services::{Actor, Role};
use crate::state::SharedState;

const SESSION_USER_KEY: &str = "user";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Session-cookie authentication for every route behind the login wall.
pub async fn auth_middleware(
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(Some(actor)) = session.get::<Actor>(SESSION_USER_KEY).await {
        tracing::Span::current().record("user_id", &actor.username);
        return Ok(next.run(request).await);
    }

    let response = (StatusCode::UNAUTHORIZED, "Unauthorized");
    Ok(response.into_response())
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state.auth.login(&payload.username, &payload.password).await?;

    let role = Role::parse(&user.role)
        .ok_or_else(|| ApiError::internal(format!("Unknown role '{}' on record", user.role)))?;
    let actor = Actor {
        username: user.username.clone(),
        role,
    };

    if let Err(e) = session.insert(SESSION_USER_KEY, &actor).await {
        return Err(ApiError::internal(format!("Failed to create session: {e}")));
    }

    tracing::info!("User logged in: {}", actor.username);

    Ok(Json(ApiResponse::success(user.into())))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
pub async fn get_current_user(
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

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let actor = get_session_actor(&session).await?;

    state
        .auth
        .change_password(
            &actor.username,
            &payload.current_password,
            &payload.new_password,
            &payload.confirm_password,
        )
        .await?;

    tracing::info!("Password changed for user: {}", actor.username);

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}

/// Get the logged-in actor from the session, or 401.
pub async fn get_session_actor(session: &Session) -> Result<Actor, ApiError> {
    session
        .get::<Actor>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}
