pub use super::article_comments::Entity as ArticleComments;
pub use super::article_likes::Entity as ArticleLikes;
pub use super::articles::Entity as Articles;
pub use super::chat_messages::Entity as ChatMessages;
pub use super::users::Entity as Users;
