use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::database::models::{comment, user};
use crate::error::ApiError;
use crate::middleware::auth::{AuthUser, MaybeUser};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::serializers::article::{comment_body, CommentResponse, CommentsResponse};
use crate::serializers::user::profile;
use crate::state::AppState;
use crate::validators::article::{validate_comment, CreateCommentRequest};

use super::articles::find_by_slug;

/// POST /api/articles/:slug/comments - Comment on an article
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(author): AuthUser,
    Path(slug): Path<String>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> ApiResult<CommentResponse> {
    let Json(CreateCommentRequest { comment: req }) = payload?;
    validate_comment(&req)?;

    let entry = find_by_slug(&state.pool, &slug).await?;
    let posted = comment::create_comment(&state.pool, entry.id, author.id, &req.body).await?;

    tracing::info!("User {} commented on article: {}", author.username, slug);

    // The commenter never follows themself
    let body = comment_body(&posted, profile(&author, false));
    Ok(ApiResponse::created(CommentResponse { comment: body }))
}

/// GET /api/articles/:slug/comments - Comments on an article, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(slug): Path<String>,
) -> ApiResult<CommentsResponse> {
    let entry = find_by_slug(&state.pool, &slug).await?;
    let rows = comment::article_comments(&state.pool, entry.id).await?;

    let mut comments = Vec::with_capacity(rows.len());
    for row in &rows {
        let author = user::find_user_by_id(&state.pool, row.author_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Author not found"))?;

        let following = match &viewer {
            Some(viewer) => user::is_following(&state.pool, viewer.id, author.id).await?,
            None => false,
        };

        comments.push(comment_body(row, profile(&author, following)));
    }

    Ok(ApiResponse::success(CommentsResponse { comments }))
}

/// DELETE /api/articles/:slug/comments/:id - Remove a comment; author or admin only
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((slug, id)): Path<(String, i64)>,
) -> ApiResult<()> {
    let entry = find_by_slug(&state.pool, &slug).await?;

    let target = comment::find_comment(&state.pool, id)
        .await?
        .filter(|target| target.article_id == entry.id)
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    if target.author_id != caller.id && !caller.is_admin() {
        return Err(ApiError::forbidden("Only the author can delete a comment"));
    }

    comment::delete_comment(&state.pool, target.id).await?;

    tracing::info!(
        "User {} deleted comment {} on article: {}",
        caller.username,
        target.id,
        slug
    );

    Ok(ApiResponse::no_content())
}
