use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::get_session_actor;
use super::validation::validate_article_id;
use super::{ApiError, ApiResponse, ArticleDto, CommentDto, LikeDto, SearchResultDto, TranslationDto};
use crate::entities::articles;
use crate::services::translate::strip_markup;
use crate::services::{ArticleInput, ArticleService, ChartConfig};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    /// Free-text query; when present the listing is relevance-ranked and
    /// carries an extractive summary.
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
    pub attachment: Option<String>,
    pub chart: Option<ChartConfig>,
}

#[derive(Deserialize)]
pub struct UpdateArticleRequest {
    pub title: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

#[derive(Deserialize)]
pub struct ShareRequest {
    pub to: String,
}

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub target: Option<String>,
}

/// GET /articles: every article, insertion order. With `?q=` the result is
/// ranked by relevance and topped with a summary of the best matches.
pub async fn list_articles(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<SearchResultDto>>, ApiError> {
    let actor = get_session_actor(&session).await?;
    let corpus = state.store.list_articles().await?;

    let q = query.q.as_deref().unwrap_or("");
    let outcome = state.search.search(corpus, q);

    let mut articles = Vec::with_capacity(outcome.articles.len());
    for (article, score) in outcome.articles.into_iter().zip(outcome.scores) {
        let score = if q.trim().is_empty() { None } else { Some(score) };
        articles.push(hydrate(&state, article, &actor.username, score).await?);
    }

    Ok(Json(ApiResponse::success(SearchResultDto {
        articles,
        summary: outcome.summary,
    })))
}

/// GET /articles/mine: the management view. Own articles for regular
/// users, everything for editors and admins. Newest first.
pub async fn list_my_articles(
    State(state): State<Arc<SharedState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<ArticleDto>>>, ApiError> {
    let actor = get_session_actor(&session).await?;
    let articles = state.articles.list_for(&actor).await?;

    let mut dtos = Vec::with_capacity(articles.len());
    for article in articles {
        dtos.push(hydrate(&state, article, &actor.username, None).await?);
    }

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /articles
pub async fn create_article(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ArticleDto>>), ApiError> {
    let actor = get_session_actor(&session).await?;

    let article = state
        .articles
        .create(
            &actor.username,
            ArticleInput {
                title: payload.title,
                content: payload.content,
                attachment: payload.attachment,
                chart: payload.chart,
            },
        )
        .await?;

    tracing::info!("Article created: {} by {}", article.id, actor.username);

    let dto = hydrate(&state, article, &actor.username, None).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
}

/// GET /articles/{id}
pub async fn get_article(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ArticleDto>>, ApiError> {
    let actor = get_session_actor(&session).await?;
    let id = validate_article_id(id)?;

    let article = state
        .store
        .get_article(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article", id))?;

    let dto = hydrate(&state, article, &actor.username, None).await?;
    Ok(Json(ApiResponse::success(dto)))
}

/// PUT /articles/{id}
pub async fn update_article(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateArticleRequest>,
) -> Result<Json<ApiResponse<ArticleDto>>, ApiError> {
    let actor = get_session_actor(&session).await?;
    let id = validate_article_id(id)?;

    let article = state
        .articles
        .update(&actor, id, payload.title, payload.content)
        .await?;

    let dto = hydrate(&state, article, &actor.username, None).await?;
    Ok(Json(ApiResponse::success(dto)))
}

/// DELETE /articles/{id}
pub async fn delete_article(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let actor = get_session_actor(&session).await?;
    let id = validate_article_id(id)?;

    state.articles.delete(&actor, id).await?;

    tracing::info!("Article deleted: {} by {}", id, actor.username);

    Ok(StatusCode::NO_CONTENT)
}

/// POST /articles/{id}/like: at most one like per user per article. A
/// repeat never claims a new like.
pub async fn like_article(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<LikeDto>>, ApiError> {
    let actor = get_session_actor(&session).await?;
    let id = validate_article_id(id)?;

    let (likes, liked) = state.articles.like(id, &actor.username).await?;

    Ok(Json(ApiResponse::success(LikeDto { likes, liked })))
}

/// GET /articles/{id}/comments
pub async fn list_comments(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<CommentDto>>>, ApiError> {
    let id = validate_article_id(id)?;

    if state.store.get_article(id).await?.is_none() {
        return Err(ApiError::not_found("Article", id));
    }

    let comments = state.store.article_comments(id).await?;
    Ok(Json(ApiResponse::success(
        comments.into_iter().map(CommentDto::from).collect(),
    )))
}

/// POST /articles/{id}/comments
pub async fn add_comment(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentDto>>), ApiError> {
    let actor = get_session_actor(&session).await?;
    let id = validate_article_id(id)?;

    let comment = state
        .articles
        .comment(id, &actor.username, &payload.comment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(comment.into())),
    ))
}

/// POST /articles/{id}/share: send an excerpt of the article to a peer as
/// a chat message.
pub async fn share_article(
    State(state): State<Arc<SharedState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<ShareRequest>,
) -> Result<Json<ApiResponse<super::ChatMessageDto>>, ApiError> {
    let actor = get_session_actor(&session).await?;
    let id = validate_article_id(id)?;

    let article = state
        .store
        .get_article(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article", id))?;

    let body = ArticleService::share_message(&article);
    let message = state
        .chat
        .send(&actor.username, &payload.to, Some(body), None)
        .await?;

    Ok(Json(ApiResponse::success(message.into())))
}

/// POST /articles/{id}/translate: machine-translate the article body via
/// the configured LibreTranslate endpoint. Markup is stripped first.
pub async fn translate_article(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<i32>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<ApiResponse<TranslationDto>>, ApiError> {
    let id = validate_article_id(id)?;

    let article = state
        .store
        .get_article(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article", id))?;

    let target = payload
        .target
        .unwrap_or_else(|| state.translator.default_target().to_string());

    let plain = strip_markup(&article.content);
    let translated = state
        .translator
        .translate(&plain, &target)
        .await
        .map_err(|e| ApiError::translation_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(TranslationDto {
        translated,
        target,
    })))
}

/// Attach like count, viewer's like state and an optional relevance score.
async fn hydrate(
    state: &SharedState,
    article: articles::Model,
    viewer: &str,
    score: Option<f64>,
) -> Result<ArticleDto, ApiError> {
    let likes = state.store.article_like_count(article.id).await?;
    let liked_by_me = state.store.has_liked_article(article.id, viewer).await?;
    Ok(ArticleDto::from_model(article, likes, liked_by_me, score))
}
