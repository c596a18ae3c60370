use sea_orm::entity::prelude::*;

/// Direct message between two users. `is_read` starts false and flips to
/// true exactly once, when the receiver opens the thread.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "chat_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub sender: String,

    pub receiver: String,

    pub message: Option<String>,

    /// Attachment locator under the uploads root
    pub attachment: Option<String>,

    pub created_at: String,

    pub is_read: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
