use chrono::{DateTime, Utc};
use serde::Serialize;

use super::user::Profile;
use crate::database::models::article::Article;
use crate::database::models::comment::Comment;

/// `{"article": {...}}` envelope.
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub article: ArticleBody,
}

/// `{"articles": [...], "articlesCount": n}` envelope. The list keeps the
/// order it was given; the count is the total before pagination.
#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    pub articles: Vec<ArticleBody>,
    #[serde(rename = "articlesCount")]
    pub articles_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ArticleBody {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    #[serde(rename = "tagList")]
    pub tag_list: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub favorited: bool,
    #[serde(rename = "favoritesCount")]
    pub favorites_count: i64,
    pub author: Profile,
}

/// Pure projection: relationship flags and counts are computed by the
/// caller. Anonymous viewers pass `favorited: false` without any lookup.
pub fn article_body(
    article: &Article,
    tag_list: Vec<String>,
    author: Profile,
    favorited: bool,
    favorites_count: i64,
) -> ArticleBody {
    ArticleBody {
        slug: article.slug.clone(),
        title: article.title.clone(),
        description: article.description.clone(),
        body: article.body.clone(),
        tag_list,
        created_at: article.created_at,
        updated_at: article.updated_at,
        favorited,
        favorites_count,
        author,
    }
}

pub fn articles_response(articles: Vec<ArticleBody>, total: i64) -> ArticlesResponse {
    ArticlesResponse {
        articles,
        articles_count: total,
    }
}

/// `{"comment": {...}}` and `{"comments": [...]}` envelopes.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: CommentBody,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentBody>,
}

#[derive(Debug, Serialize)]
pub struct CommentBody {
    pub id: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub author: Profile,
}

pub fn comment_body(comment: &Comment, author: Profile) -> CommentBody {
    CommentBody {
        id: comment.id,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
        body: comment.body.clone(),
        author,
    }
}

/// `{"tags": [...]}` envelope.
#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}
