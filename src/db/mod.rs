use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{article_comments, articles, chat_messages};

pub mod migrator;
pub mod repositories;

pub use repositories::article::NewArticle;
pub use repositories::user::{NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn article_repo(&self) -> repositories::article::ArticleRepository {
        repositories::article::ArticleRepository::new(self.conn.clone())
    }

    fn chat_repo(&self) -> repositories::chat::ChatRepository {
        repositories::chat::ChatRepository::new(self.conn.clone())
    }

    // ===== Users =====

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn list_peers(&self, username: &str) -> Result<Vec<User>> {
        self.user_repo().list_peers(username).await
    }

    pub async fn create_user(&self, new_user: NewUser, config: &SecurityConfig) -> Result<User> {
        self.user_repo().create(new_user, config).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password, config)
            .await
    }

    pub async fn update_user_profile(
        &self,
        username: &str,
        display_name: Option<String>,
        bio: Option<String>,
        avatar: Option<String>,
    ) -> Result<User> {
        self.user_repo()
            .update_profile(username, display_name, bio, avatar)
            .await
    }

    // ===== Articles =====

    pub async fn list_articles(&self) -> Result<Vec<articles::Model>> {
        self.article_repo().list_all().await
    }

    pub async fn list_recent_articles(&self) -> Result<Vec<articles::Model>> {
        self.article_repo().list_recent().await
    }

    pub async fn list_articles_by_author(&self, author: &str) -> Result<Vec<articles::Model>> {
        self.article_repo().list_by_author(author).await
    }

    pub async fn get_article(&self, id: i32) -> Result<Option<articles::Model>> {
        self.article_repo().get(id).await
    }

    pub async fn create_article(&self, new_article: NewArticle) -> Result<articles::Model> {
        self.article_repo().create(new_article).await
    }

    pub async fn update_article(
        &self,
        id: i32,
        title: String,
        content: String,
    ) -> Result<articles::Model> {
        self.article_repo().update(id, title, content).await
    }

    pub async fn delete_article(&self, id: i32) -> Result<()> {
        self.article_repo().delete(id).await
    }

    pub async fn like_article(&self, article_id: i32, username: &str) -> Result<bool> {
        self.article_repo().like(article_id, username).await
    }

    pub async fn article_like_count(&self, article_id: i32) -> Result<u64> {
        self.article_repo().like_count(article_id).await
    }

    pub async fn has_liked_article(&self, article_id: i32, username: &str) -> Result<bool> {
        self.article_repo().has_liked(article_id, username).await
    }

    pub async fn article_comments(&self, article_id: i32) -> Result<Vec<article_comments::Model>> {
        self.article_repo().comments(article_id).await
    }

    pub async fn add_article_comment(
        &self,
        article_id: i32,
        username: &str,
        comment: &str,
    ) -> Result<article_comments::Model> {
        self.article_repo()
            .add_comment(article_id, username, comment)
            .await
    }

    // ===== Chat =====

    pub async fn insert_chat_message(
        &self,
        sender: &str,
        receiver: &str,
        message: Option<String>,
        attachment: Option<String>,
    ) -> Result<chat_messages::Model> {
        self.chat_repo()
            .insert(sender, receiver, message, attachment)
            .await
    }

    pub async fn chat_thread(&self, a: &str, b: &str) -> Result<Vec<chat_messages::Model>> {
        self.chat_repo().thread(a, b).await
    }

    pub async fn mark_chat_thread_read(&self, viewer: &str, peer: &str) -> Result<u64> {
        self.chat_repo().mark_thread_read(viewer, peer).await
    }

    pub async fn chat_unread_count(&self, user: &str) -> Result<u64> {
        self.chat_repo().unread_count(user).await
    }

    pub async fn chat_unread_by_sender(&self, user: &str) -> Result<HashMap<String, u64>> {
        self.chat_repo().unread_by_sender(user).await
    }
}
