//! Chat business operations: send validation, the open-thread read-state
//! transition, and unread counters.
//!
//! Message states are `{unread, read}` with a single transition, unread to
//! read, performed only when the receiver opens the thread. Clients poll;
//! there is no push channel.

use serde::Serialize;
use thiserror::Error;

use crate::db::Store;
use crate::entities::chat_messages;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Recipient not found")]
    RecipientNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ChatError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// One row of the contact list: a peer plus their unread badge.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub username: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub unread: u64,
}

pub struct ChatService {
    store: Store,
}

impl ChatService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Append a message from `from` to `to`. At least one of text and
    /// attachment must be present, self-messaging is rejected, and the
    /// recipient must exist. No size limits are enforced.
    pub async fn send(
        &self,
        from: &str,
        to: &str,
        text: Option<String>,
        attachment: Option<String>,
    ) -> Result<chat_messages::Model, ChatError> {
        if from == to {
            return Err(ChatError::Validation(
                "Cannot send a message to yourself".to_string(),
            ));
        }

        let text = text.filter(|t| !t.trim().is_empty());
        let attachment = attachment.filter(|a| !a.trim().is_empty());

        if text.is_none() && attachment.is_none() {
            return Err(ChatError::Validation(
                "Message needs text or an attachment".to_string(),
            ));
        }

        if self.store.get_user_by_username(to).await?.is_none() {
            return Err(ChatError::RecipientNotFound);
        }

        let message = self
            .store
            .insert_chat_message(from, to, text, attachment)
            .await?;

        Ok(message)
    }

    /// Fetch the thread between `viewer` and `peer`, marking everything the
    /// peer sent as read first. This is the only read-state transition and
    /// it is idempotent: reopening a fully-read thread changes nothing.
    /// Returns the messages and how many flipped to read on this open.
    pub async fn open_thread(
        &self,
        viewer: &str,
        peer: &str,
    ) -> Result<(Vec<chat_messages::Model>, u64), ChatError> {
        if self.store.get_user_by_username(peer).await?.is_none() {
            return Err(ChatError::RecipientNotFound);
        }

        let newly_read = self.store.mark_chat_thread_read(viewer, peer).await?;
        let messages = self.store.chat_thread(viewer, peer).await?;

        Ok((messages, newly_read))
    }

    /// Global notification badge: unread messages addressed to `user`
    /// across all peers.
    pub async fn unread_count(&self, user: &str) -> Result<u64, ChatError> {
        Ok(self.store.chat_unread_count(user).await?)
    }

    /// Everyone except the viewer, ordered by username, each with their
    /// per-peer unread count.
    pub async fn contacts(&self, viewer: &str) -> Result<Vec<Contact>, ChatError> {
        let peers = self.store.list_peers(viewer).await?;
        let unread = self.store.chat_unread_by_sender(viewer).await?;

        Ok(peers
            .into_iter()
            .map(|peer| {
                let count = unread.get(&peer.username).copied().unwrap_or(0);
                Contact {
                    username: peer.username,
                    display_name: peer.display_name,
                    avatar: peer.avatar,
                    unread: count,
                }
            })
            .collect())
    }
}
