use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub article_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn create_comment(
    pool: &SqlitePool,
    article_id: i64,
    author_id: i64,
    body: &str,
) -> Result<Comment, sqlx::Error> {
    let now = Utc::now();

    sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (body, article_id, author_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(body)
    .bind(article_id)
    .bind(author_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_comment(pool: &SqlitePool, id: i64) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Comments on an article in insertion order.
pub async fn article_comments(
    pool: &SqlitePool,
    article_id: i64,
) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "SELECT * FROM comments WHERE article_id = ? ORDER BY id ASC",
    )
    .bind(article_id)
    .fetch_all(pool)
    .await
}

pub async fn delete_comment(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
