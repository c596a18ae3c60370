use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    ArticleService, AuthService, ChatService, FileStore, SearchEngine, TranslationClient,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth: Arc<AuthService>,

    pub articles: Arc<ArticleService>,

    pub chat: Arc<ChatService>,

    pub search: SearchEngine,

    pub translator: Arc<TranslationClient>,

    pub files: FileStore,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let files = FileStore::new(&config.uploads.root);
        let auth = Arc::new(AuthService::new(store.clone(), config.security.clone()));
        let articles = Arc::new(ArticleService::new(store.clone(), files.clone()));
        let chat = Arc::new(ChatService::new(store.clone()));
        let search = SearchEngine::new(config.search.clone());
        let translator = Arc::new(TranslationClient::new(config.translation.clone())?);

        Ok(Self {
            config: Arc::new(config),
            store,
            auth,
            articles,
            chat,
            search,
            translator,
            files,
        })
    }
}
