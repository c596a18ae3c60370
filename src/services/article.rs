//! Article business operations: authorship and role checks, like-once
//! semantics, comments, chart configuration validation and the share-to-chat
//! message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{NewArticle, Store};
use crate::entities::{article_comments, articles};
use crate::services::auth::Actor;
use crate::services::files::FileStore;

/// How many content characters the share-to-chat excerpt carries.
const SHARE_EXCERPT_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("Article not found")]
    NotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ArticleError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Embedded chart description. Rendering is an external collaborator's job;
/// the service only validates the CSV locator and stores the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// X-axis column name in the CSV
    pub x: String,
    /// Y-axis column name in the CSV
    pub y: String,
    pub kind: ChartKind,
    /// Hex color, e.g. `#ff5da2`
    pub color: String,
    /// Locator of the CSV source under the uploads root
    pub csv: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Area,
}

/// Author input for a new article.
#[derive(Debug, Clone)]
pub struct ArticleInput {
    pub title: String,
    pub content: String,
    pub attachment: Option<String>,
    pub chart: Option<ChartConfig>,
}

pub struct ArticleService {
    store: Store,
    files: FileStore,
}

impl ArticleService {
    #[must_use]
    pub const fn new(store: Store, files: FileStore) -> Self {
        Self { store, files }
    }

    pub async fn create(
        &self,
        author: &str,
        input: ArticleInput,
    ) -> Result<articles::Model, ArticleError> {
        if input.title.trim().is_empty() || input.content.trim().is_empty() {
            return Err(ArticleError::Validation(
                "Title and content are required".to_string(),
            ));
        }

        let chart_config = match &input.chart {
            Some(chart) => {
                self.validate_chart(chart).await?;
                Some(serde_json::to_string(chart).map_err(|e| {
                    ArticleError::Internal(format!("Failed to serialize chart config: {e}"))
                })?)
            }
            None => None,
        };

        let article = self
            .store
            .create_article(NewArticle {
                title: input.title,
                content: input.content,
                author: author.to_string(),
                attachment: input.attachment,
                chart_config,
            })
            .await?;

        Ok(article)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: i32,
        title: String,
        content: String,
    ) -> Result<articles::Model, ArticleError> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(ArticleError::Validation(
                "Title and content are required".to_string(),
            ));
        }

        let article = self
            .store
            .get_article(id)
            .await?
            .ok_or(ArticleError::NotFound)?;

        Self::check_can_modify(actor, &article)?;

        let updated = self.store.update_article(id, title, content).await?;
        Ok(updated)
    }

    /// Deletes only the article row; likes and comments are left behind
    /// (orphan-tolerant, preserved from the source behavior).
    pub async fn delete(&self, actor: &Actor, id: i32) -> Result<(), ArticleError> {
        let article = self
            .store
            .get_article(id)
            .await?
            .ok_or(ArticleError::NotFound)?;

        Self::check_can_modify(actor, &article)?;

        self.store.delete_article(id).await?;
        Ok(())
    }

    /// Role-scoped listing: regular users see their own articles, editors
    /// and admins see everything. Newest first.
    pub async fn list_for(&self, actor: &Actor) -> Result<Vec<articles::Model>, ArticleError> {
        let articles = if actor.role.can_moderate() {
            self.store.list_recent_articles().await?
        } else {
            self.store.list_articles_by_author(&actor.username).await?
        };

        Ok(articles)
    }

    /// Record a like if this user has none for the article yet. Returns the
    /// resulting like count and whether this call inserted a row, so a
    /// repeated like is never reported as a new one.
    pub async fn like(&self, id: i32, username: &str) -> Result<(u64, bool), ArticleError> {
        if self.store.get_article(id).await?.is_none() {
            return Err(ArticleError::NotFound);
        }

        let newly_liked = self.store.like_article(id, username).await?;
        let likes = self.store.article_like_count(id).await?;

        Ok((likes, newly_liked))
    }

    pub async fn comment(
        &self,
        id: i32,
        username: &str,
        text: &str,
    ) -> Result<article_comments::Model, ArticleError> {
        if text.trim().is_empty() {
            return Err(ArticleError::Validation(
                "Comment cannot be empty".to_string(),
            ));
        }

        if self.store.get_article(id).await?.is_none() {
            return Err(ArticleError::NotFound);
        }

        let comment = self.store.add_article_comment(id, username, text).await?;
        Ok(comment)
    }

    /// The chat message body used when an article is shared to a peer:
    /// title plus a 500-character excerpt of the content.
    #[must_use]
    pub fn share_message(article: &articles::Model) -> String {
        let excerpt: String = article.content.chars().take(SHARE_EXCERPT_CHARS).collect();

        format!(
            "📚 *{}*\n\n{}...\n\n🔗 Shared from Knowledge Base",
            article.title, excerpt
        )
    }

    fn check_can_modify(actor: &Actor, article: &articles::Model) -> Result<(), ArticleError> {
        if article.author != actor.username && !actor.role.can_moderate() {
            return Err(ArticleError::Forbidden(
                "Only the author, editors or admins can modify this article".to_string(),
            ));
        }

        Ok(())
    }

    /// A chart config that names a CSV source must point at a stored file.
    async fn validate_chart(&self, chart: &ChartConfig) -> Result<(), ArticleError> {
        if chart.x.trim().is_empty() || chart.y.trim().is_empty() {
            return Err(ArticleError::Validation(
                "Chart config needs both x and y columns".to_string(),
            ));
        }

        if let Some(csv) = &chart.csv
            && !self.files.exists(csv).await
        {
            return Err(ArticleError::Validation(format!(
                "Chart data file does not exist: {csv}"
            )));
        }

        Ok(())
    }
}

/// Parse the stored JSON chart config, tolerating rows written before the
/// column existed or with malformed content.
#[must_use]
pub fn parse_chart_config(stored: Option<&str>) -> Option<ChartConfig> {
    stored.and_then(|raw| serde_json::from_str(raw).ok())
}
