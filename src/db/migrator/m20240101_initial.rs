use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Hash the bootstrap admin password using Argon2id.
///
/// The `admin` / `admin123` pair is the documented bootstrap credential and
/// must be rotated in any real deployment.
fn hash_bootstrap_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let password = b"admin123";
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password, &salt)
        .expect("Failed to hash bootstrap password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Articles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ArticleLikes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ArticleComments)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ChatMessages)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One like per user per article
        manager
            .create_index(
                Index::create()
                    .name("idx_article_likes_article_user")
                    .table(ArticleLikes)
                    .col(crate::entities::article_likes::Column::ArticleId)
                    .col(crate::entities::article_likes::Column::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unread badge lookups scan by receiver
        manager
            .create_index(
                Index::create()
                    .name("idx_chat_messages_receiver_unread")
                    .table(ChatMessages)
                    .col(crate::entities::chat_messages::Column::Receiver)
                    .col(crate::entities::chat_messages::Column::IsRead)
                    .to_owned(),
            )
            .await?;

        // Seed the bootstrap admin account
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_bootstrap_password();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                crate::entities::users::Column::Username,
                crate::entities::users::Column::PasswordHash,
                crate::entities::users::Column::Role,
                crate::entities::users::Column::MustChangePassword,
                crate::entities::users::Column::DisplayName,
                crate::entities::users::Column::Bio,
                crate::entities::users::Column::CreatedAt,
                crate::entities::users::Column::UpdatedAt,
            ])
            .values_panic([
                "admin".into(),
                password_hash.into(),
                "admin".into(),
                true.into(),
                "Administrator".into(),
                "Super Admin".into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatMessages).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ArticleComments).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ArticleLikes).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Articles).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
