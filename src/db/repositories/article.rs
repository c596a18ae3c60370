use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::entities::{article_comments, article_likes, articles};

/// Fields required to insert an article.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub author: String,
    pub attachment: Option<String>,
    pub chart_config: Option<String>,
}

pub struct ArticleRepository {
    conn: DatabaseConnection,
}

impl ArticleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Full corpus in insertion order. The search engine depends on this
    /// ordering for its stable tie-breaking.
    pub async fn list_all(&self) -> Result<Vec<articles::Model>> {
        articles::Entity::find()
            .order_by_asc(articles::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list articles")
    }

    /// Newest first, across all authors.
    pub async fn list_recent(&self) -> Result<Vec<articles::Model>> {
        articles::Entity::find()
            .order_by_desc(articles::Column::CreatedAt)
            .order_by_desc(articles::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list recent articles")
    }

    /// Newest first, one author.
    pub async fn list_by_author(&self, author: &str) -> Result<Vec<articles::Model>> {
        articles::Entity::find()
            .filter(articles::Column::Author.eq(author))
            .order_by_desc(articles::Column::CreatedAt)
            .order_by_desc(articles::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list articles by author")
    }

    pub async fn get(&self, id: i32) -> Result<Option<articles::Model>> {
        articles::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query article")
    }

    pub async fn create(&self, new_article: NewArticle) -> Result<articles::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = articles::ActiveModel {
            title: Set(new_article.title),
            content: Set(new_article.content),
            author: Set(new_article.author),
            attachment: Set(new_article.attachment),
            chart_config: Set(new_article.chart_config),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert article")
    }

    pub async fn update(
        &self,
        id: i32,
        title: String,
        content: String,
    ) -> Result<articles::Model> {
        let article = articles::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query article for update")?
            .ok_or_else(|| anyhow::anyhow!("Article not found: {id}"))?;

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: articles::ActiveModel = article.into();
        active.title = Set(title);
        active.content = Set(content);
        active.updated_at = Set(Some(now));
        active
            .update(&self.conn)
            .await
            .context("Failed to update article")
    }

    /// Deletes the article row only. Likes and comments are intentionally
    /// left in place (orphan-tolerant, see DESIGN.md).
    pub async fn delete(&self, id: i32) -> Result<()> {
        articles::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete article")?;
        Ok(())
    }

    /// Insert a like if none exists for this (article, username) pair.
    /// Returns true when a row was actually inserted. The unique index makes
    /// a concurrent duplicate lose the race, which is also reported as false.
    pub async fn like(&self, article_id: i32, username: &str) -> Result<bool> {
        let existing = article_likes::Entity::find()
            .filter(article_likes::Column::ArticleId.eq(article_id))
            .filter(article_likes::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query existing like")?;

        if existing.is_some() {
            return Ok(false);
        }

        let active = article_likes::ActiveModel {
            article_id: Set(article_id),
            username: Set(username.to_string()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(_) => Ok(true),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(false),
                _ => Err(e).context("Failed to insert like"),
            },
        }
    }

    pub async fn like_count(&self, article_id: i32) -> Result<u64> {
        article_likes::Entity::find()
            .filter(article_likes::Column::ArticleId.eq(article_id))
            .count(&self.conn)
            .await
            .context("Failed to count likes")
    }

    pub async fn has_liked(&self, article_id: i32, username: &str) -> Result<bool> {
        let count = article_likes::Entity::find()
            .filter(article_likes::Column::ArticleId.eq(article_id))
            .filter(article_likes::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("Failed to query like")?;

        Ok(count > 0)
    }

    /// Comments in creation order.
    pub async fn comments(&self, article_id: i32) -> Result<Vec<article_comments::Model>> {
        article_comments::Entity::find()
            .filter(article_comments::Column::ArticleId.eq(article_id))
            .order_by_asc(article_comments::Column::CreatedAt)
            .order_by_asc(article_comments::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list comments")
    }

    pub async fn add_comment(
        &self,
        article_id: i32,
        username: &str,
        comment: &str,
    ) -> Result<article_comments::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = article_comments::ActiveModel {
            article_id: Set(article_id),
            username: Set(username.to_string()),
            comment: Set(comment.to_string()),
            created_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert comment")
    }
}
