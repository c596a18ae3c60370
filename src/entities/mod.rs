pub mod prelude;

pub mod article_comments;
pub mod article_likes;
pub mod articles;
pub mod chat_messages;
pub mod users;
