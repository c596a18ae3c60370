use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::get_session_actor;
use super::validation::validate_username;
use super::{ApiError, ApiResponse, ChatMessageDto, ContactDto, ThreadDto, UnreadDto};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub message: Option<String>,
    pub attachment: Option<String>,
}

/// GET /chat/contacts: everyone except the caller, with per-peer unread
/// counts for the sidebar badges.
pub async fn list_contacts(
    State(state): State<Arc<SharedState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<ContactDto>>>, ApiError> {
    let actor = get_session_actor(&session).await?;

    let contacts = state.chat.contacts(&actor.username).await?;
    Ok(Json(ApiResponse::success(
        contacts.into_iter().map(ContactDto::from).collect(),
    )))
}

/// GET /chat/unread: the global unread badge.
pub async fn unread_count(
    State(state): State<Arc<SharedState>>,
    session: Session,
) -> Result<Json<ApiResponse<UnreadDto>>, ApiError> {
    let actor = get_session_actor(&session).await?;

    let unread = state.chat.unread_count(&actor.username).await?;
    Ok(Json(ApiResponse::success(UnreadDto { unread })))
}

/// GET /chat/{peer}: open the thread with `peer`. Opening is what marks
/// the peer's messages as read; reopening a read thread changes nothing.
pub async fn open_thread(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Path(peer): Path<String>,
) -> Result<Json<ApiResponse<ThreadDto>>, ApiError> {
    let actor = get_session_actor(&session).await?;
    validate_username(&peer)?;

    let (messages, newly_read) = state.chat.open_thread(&actor.username, &peer).await?;

    Ok(Json(ApiResponse::success(ThreadDto {
        messages: messages.into_iter().map(ChatMessageDto::from).collect(),
        newly_read,
    })))
}

/// POST /chat/{peer}: send a message with text, an attachment locator, or
/// both.
pub async fn send_message(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Path(peer): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ChatMessageDto>>), ApiError> {
    let actor = get_session_actor(&session).await?;
    validate_username(&peer)?;

    let message = state
        .chat
        .send(&actor.username, &peer, payload.message, payload.attachment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(message.into())),
    ))
}
