pub mod article;
pub use article::{ArticleError, ArticleInput, ArticleService, ChartConfig, ChartKind};

pub mod auth;
pub use auth::{Actor, AuthError, AuthService, Role};

pub mod chat;
pub use chat::{ChatError, ChatService, Contact};

pub mod files;
pub use files::FileStore;

pub mod search;
pub use search::{SearchEngine, SearchOutcome};

pub mod summary;

pub mod translate;
pub use translate::TranslationClient;
