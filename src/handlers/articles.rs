use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::database::models::article::{self, Article, ArticleFilter};
use crate::database::models::user::{self, User};
use crate::error::ApiError;
use crate::middleware::auth::{AuthUser, MaybeUser};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::serializers::article::{
    article_body, articles_response, ArticleBody, ArticleResponse, ArticlesResponse, TagsResponse,
};
use crate::serializers::user::profile;
use crate::state::AppState;
use crate::validators::article::{
    validate_create, validate_update, CreateArticleRequest, UpdateArticleRequest,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Clamp requested page bounds to configured limits.
pub(crate) fn page_bounds(
    state: &AppState,
    limit: Option<i64>,
    offset: Option<i64>,
) -> (i64, i64) {
    let limit = limit
        .unwrap_or(state.config.api.default_page_size)
        .clamp(0, state.config.api.max_page_size);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Assemble the full wire view of one article for a given viewer. The
/// relationship lookups only run when a viewer is present.
pub(crate) async fn article_view(
    pool: &SqlitePool,
    entry: &Article,
    viewer: Option<&User>,
) -> Result<ArticleBody, ApiError> {
    let tags = article::article_tags(pool, entry.id).await?;

    let author = user::find_user_by_id(pool, entry.author_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Author not found"))?;

    let (favorited, following) = match viewer {
        Some(viewer) => (
            article::is_favorited(pool, viewer.id, entry.id).await?,
            user::is_following(pool, viewer.id, author.id).await?,
        ),
        None => (false, false),
    };

    let count = article::favorites_count(pool, entry.id).await?;

    Ok(article_body(
        entry,
        tags,
        profile(&author, following),
        favorited,
        count,
    ))
}

async fn articles_view(
    pool: &SqlitePool,
    entries: Vec<Article>,
    total: i64,
    viewer: Option<&User>,
) -> Result<ArticlesResponse, ApiError> {
    let mut bodies = Vec::with_capacity(entries.len());
    for entry in &entries {
        bodies.push(article_view(pool, entry, viewer).await?);
    }
    Ok(articles_response(bodies, total))
}

pub(crate) async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Article, ApiError> {
    article::find_article_by_slug(pool, slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))
}

/// GET /api/articles - Filtered listing, newest first
pub async fn list_articles(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<ArticlesResponse> {
    let (limit, offset) = page_bounds(&state, query.limit, query.offset);
    let filter = ArticleFilter {
        tag: query.tag,
        author: query.author,
        favorited: query.favorited,
        limit,
        offset,
    };

    let (entries, total) = article::list_articles(&state.pool, &filter).await?;
    let response = articles_view(&state.pool, entries, total, viewer.as_ref()).await?;

    Ok(ApiResponse::success(response))
}

/// GET /api/articles/feed - Articles by followed authors, newest first
pub async fn feed(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<ArticlesResponse> {
    let (limit, offset) = page_bounds(&state, query.limit, query.offset);

    let (entries, total) =
        article::feed_articles(&state.pool, viewer.id, limit, offset).await?;
    let response = articles_view(&state.pool, entries, total, Some(&viewer)).await?;

    Ok(ApiResponse::success(response))
}

/// GET /api/articles/:slug - Single article, viewer-scoped flags
pub async fn get_article(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(slug): Path<String>,
) -> ApiResult<ArticleResponse> {
    let entry = find_by_slug(&state.pool, &slug).await?;
    let body = article_view(&state.pool, &entry, viewer.as_ref()).await?;

    Ok(ApiResponse::success(ArticleResponse { article: body }))
}

/// POST /api/articles - Create an article owned by the caller
pub async fn create_article(
    State(state): State<AppState>,
    AuthUser(author): AuthUser,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> ApiResult<ArticleResponse> {
    let Json(CreateArticleRequest { article: req }) = payload?;
    let slug = validate_create(&req)?;

    // A slug collision surfaces from the unique index as a conflict
    let entry = article::create_article(
        &state.pool,
        author.id,
        &slug,
        &req.title,
        &req.description,
        &req.body,
        &req.tag_list,
    )
    .await?;

    let body = article_view(&state.pool, &entry, Some(&author)).await?;
    Ok(ApiResponse::created(ArticleResponse { article: body }))
}

/// PUT /api/articles/:slug - Update an article; only the author may
pub async fn update_article(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(slug): Path<String>,
    payload: Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> ApiResult<ArticleResponse> {
    let entry = find_by_slug(&state.pool, &slug).await?;
    if entry.author_id != caller.id {
        return Err(ApiError::forbidden("Only the author can update an article"));
    }

    let Json(UpdateArticleRequest { article: req }) = payload?;
    let new_slug = validate_update(&req)?;

    let mut changed = entry;
    if let Some(title) = req.title {
        changed.title = title;
    }
    if let Some(slug) = new_slug {
        changed.slug = slug;
    }
    if let Some(description) = req.description {
        changed.description = description;
    }
    if let Some(body) = req.body {
        changed.body = body;
    }

    let updated = article::update_article(&state.pool, &changed).await?;
    let body = article_view(&state.pool, &updated, Some(&caller)).await?;

    Ok(ApiResponse::success(ArticleResponse { article: body }))
}

/// DELETE /api/articles/:slug - Remove an article (author or admin)
pub async fn delete_article(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(slug): Path<String>,
) -> ApiResult<()> {
    let entry = find_by_slug(&state.pool, &slug).await?;
    if entry.author_id != caller.id && !caller.is_admin() {
        return Err(ApiError::forbidden("Only the author can delete an article"));
    }

    article::delete_article(&state.pool, entry.id).await?;
    Ok(ApiResponse::no_content())
}

/// POST /api/articles/:slug/favorite - Mark an article as favorited
pub async fn favorite(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(slug): Path<String>,
) -> ApiResult<ArticleResponse> {
    let entry = find_by_slug(&state.pool, &slug).await?;
    article::favorite(&state.pool, viewer.id, entry.id).await?;

    let body = article_view(&state.pool, &entry, Some(&viewer)).await?;
    Ok(ApiResponse::success(ArticleResponse { article: body }))
}

/// DELETE /api/articles/:slug/favorite - Remove a favorite
pub async fn unfavorite(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(slug): Path<String>,
) -> ApiResult<ArticleResponse> {
    let entry = find_by_slug(&state.pool, &slug).await?;
    article::unfavorite(&state.pool, viewer.id, entry.id).await?;

    let body = article_view(&state.pool, &entry, Some(&viewer)).await?;
    Ok(ApiResponse::success(ArticleResponse { article: body }))
}

/// GET /api/tags - Every known tag, alphabetical
pub async fn tags(State(state): State<AppState>) -> ApiResult<TagsResponse> {
    let tags = article::all_tags(&state.pool).await?;
    Ok(ApiResponse::success(TagsResponse { tags }))
}
