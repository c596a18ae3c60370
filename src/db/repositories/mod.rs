pub mod article;
pub mod chat;
pub mod user;
