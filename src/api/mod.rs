use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::state::SharedState;

pub mod articles;
pub mod auth;
pub mod chat;
mod error;
pub mod profile;
mod types;
pub mod uploads;
pub mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

pub fn router(state: Arc<SharedState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();
    let uploads_root = state.config.uploads.root.clone();
    let session_timeout = state.config.server.session_timeout_minutes;
    let body_limit = state.config.uploads.max_upload_mb.saturating_mul(1024 * 1024);

    let protected_routes = create_protected_router();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_timeout,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service("/uploads", ServeDir::new(uploads_root))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router() -> Router<Arc<SharedState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/password", put(auth::change_password))
        .route("/articles", get(articles::list_articles))
        .route("/articles", post(articles::create_article))
        .route("/articles/mine", get(articles::list_my_articles))
        .route("/articles/{id}", get(articles::get_article))
        .route("/articles/{id}", put(articles::update_article))
        .route("/articles/{id}", delete(articles::delete_article))
        .route("/articles/{id}/like", post(articles::like_article))
        .route("/articles/{id}/comments", get(articles::list_comments))
        .route("/articles/{id}/comments", post(articles::add_comment))
        .route("/articles/{id}/share", post(articles::share_article))
        .route("/articles/{id}/translate", post(articles::translate_article))
        .route("/chat/contacts", get(chat::list_contacts))
        .route("/chat/unread", get(chat::unread_count))
        .route("/chat/{peer}", get(chat::open_thread))
        .route("/chat/{peer}", post(chat::send_message))
        .route("/profile", get(profile::get_profile))
        .route("/profile", put(profile::update_profile))
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/{username}/password", put(users::reset_password))
        .route("/uploads/{category}", post(uploads::upload_file))
        .route_layer(middleware::from_fn(auth::auth_middleware))
}
