use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::chat_messages;

pub struct ChatRepository {
    conn: DatabaseConnection,
}

impl ChatRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Append a message. Read state always starts false; only the receiver
    /// flips it, via [`mark_thread_read`](Self::mark_thread_read).
    pub async fn insert(
        &self,
        sender: &str,
        receiver: &str,
        message: Option<String>,
        attachment: Option<String>,
    ) -> Result<chat_messages::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = chat_messages::ActiveModel {
            sender: Set(sender.to_string()),
            receiver: Set(receiver.to_string()),
            message: Set(message),
            attachment: Set(attachment),
            created_at: Set(now),
            is_read: Set(false),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert chat message")
    }

    /// The full thread between two users, both directions, in non-decreasing
    /// creation order. Equal timestamps fall back to insertion (id) order.
    pub async fn thread(&self, a: &str, b: &str) -> Result<Vec<chat_messages::Model>> {
        chat_messages::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(chat_messages::Column::Sender.eq(a))
                            .add(chat_messages::Column::Receiver.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(chat_messages::Column::Sender.eq(b))
                            .add(chat_messages::Column::Receiver.eq(a)),
                    ),
            )
            .order_by_asc(chat_messages::Column::CreatedAt)
            .order_by_asc(chat_messages::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to load chat thread")
    }

    /// Mark everything `peer` sent to `viewer` as read. Idempotent: already
    /// read messages are excluded from the update. Returns the number of
    /// messages that transitioned.
    pub async fn mark_thread_read(&self, viewer: &str, peer: &str) -> Result<u64> {
        let result = chat_messages::Entity::update_many()
            .col_expr(chat_messages::Column::IsRead, Expr::value(true))
            .filter(chat_messages::Column::Sender.eq(peer))
            .filter(chat_messages::Column::Receiver.eq(viewer))
            .filter(chat_messages::Column::IsRead.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to mark thread read")?;

        Ok(result.rows_affected)
    }

    /// Unread messages addressed to `user`, across all peers.
    pub async fn unread_count(&self, user: &str) -> Result<u64> {
        chat_messages::Entity::find()
            .filter(chat_messages::Column::Receiver.eq(user))
            .filter(chat_messages::Column::IsRead.eq(false))
            .count(&self.conn)
            .await
            .context("Failed to count unread messages")
    }

    /// Unread counts addressed to `user`, keyed by sender. Peers with no
    /// unread messages are absent.
    pub async fn unread_by_sender(&self, user: &str) -> Result<HashMap<String, u64>> {
        let unread = chat_messages::Entity::find()
            .filter(chat_messages::Column::Receiver.eq(user))
            .filter(chat_messages::Column::IsRead.eq(false))
            .all(&self.conn)
            .await
            .context("Failed to load unread messages")?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for msg in unread {
            *counts.entry(msg.sender).or_insert(0) += 1;
        }

        Ok(counts)
    }
}
