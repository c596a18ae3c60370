use serde::Serialize;

use crate::db::User;
use crate::entities::{article_comments, articles, chat_messages};
use crate::services::Contact;
use crate::services::article::{ChartConfig, parse_chart_config};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub username: String,
    pub role: String,
    pub must_change_password: bool,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            role: user.role,
            must_change_password: user.must_change_password,
            display_name: user.display_name,
            bio: user.bio,
            avatar: user.avatar,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub attachment: Option<String>,
    pub chart: Option<ChartConfig>,
    pub likes: u64,
    pub liked_by_me: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl ArticleDto {
    pub fn from_model(
        article: articles::Model,
        likes: u64,
        liked_by_me: bool,
        score: Option<f64>,
    ) -> Self {
        let chart = parse_chart_config(article.chart_config.as_deref());
        Self {
            id: article.id,
            title: article.title,
            content: article.content,
            author: article.author,
            attachment: article.attachment,
            chart,
            likes,
            liked_by_me,
            score,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResultDto {
    pub articles: Vec<ArticleDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentDto {
    pub id: i32,
    pub username: String,
    pub comment: String,
    pub created_at: String,
}

impl From<article_comments::Model> for CommentDto {
    fn from(model: article_comments::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            comment: model.comment,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LikeDto {
    pub likes: u64,
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatMessageDto {
    pub id: i32,
    pub sender: String,
    pub receiver: String,
    pub message: Option<String>,
    pub attachment: Option<String>,
    pub created_at: String,
    pub is_read: bool,
}

impl From<chat_messages::Model> for ChatMessageDto {
    fn from(model: chat_messages::Model) -> Self {
        Self {
            id: model.id,
            sender: model.sender,
            receiver: model.receiver,
            message: model.message,
            attachment: model.attachment,
            created_at: model.created_at,
            is_read: model.is_read,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ThreadDto {
    pub messages: Vec<ChatMessageDto>,
    /// How many of the peer's messages flipped to read on this open.
    pub newly_read: u64,
}

#[derive(Debug, Serialize)]
pub struct ContactDto {
    pub username: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub unread: u64,
}

impl From<Contact> for ContactDto {
    fn from(contact: Contact) -> Self {
        Self {
            username: contact.username,
            display_name: contact.display_name,
            avatar: contact.avatar,
            unread: contact.unread,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadDto {
    pub unread: u64,
}

#[derive(Debug, Serialize)]
pub struct UploadDto {
    pub locator: String,
}

#[derive(Debug, Serialize)]
pub struct TranslationDto {
    pub translated: String,
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
