use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing filters. All optional; `limit`/`offset` are already clamped by
/// the handler layer.
#[derive(Debug, Default)]
pub struct ArticleFilter {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Insert an article plus its tag rows in one transaction. Tag order is
/// preserved through the `position` column.
pub async fn create_article(
    pool: &SqlitePool,
    author_id: i64,
    slug: &str,
    title: &str,
    description: &str,
    body: &str,
    tags: &[String],
) -> Result<Article, sqlx::Error> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let article = sqlx::query_as::<_, Article>(
        "INSERT INTO articles (slug, title, description, body, author_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(slug)
    .bind(title)
    .bind(description)
    .bind(body)
    .bind(author_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for (position, name) in tags.iter().enumerate() {
        sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT OR IGNORE INTO article_tags (article_id, tag_id, position) \
             SELECT ?, id, ? FROM tags WHERE name = ?",
        )
        .bind(article.id)
        .bind(position as i64)
        .bind(name)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(article)
}

pub async fn find_article_by_slug(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<Article>, sqlx::Error> {
    sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

/// Persist title/description/body/slug changes. Tags are fixed at creation.
pub async fn update_article(pool: &SqlitePool, article: &Article) -> Result<Article, sqlx::Error> {
    let now = Utc::now();

    sqlx::query_as::<_, Article>(
        "UPDATE articles SET slug = ?, title = ?, description = ?, body = ?, updated_at = ? \
         WHERE id = ? RETURNING *",
    )
    .bind(&article.slug)
    .bind(&article.title)
    .bind(&article.description)
    .bind(&article.body)
    .bind(now)
    .bind(article.id)
    .fetch_one(pool)
    .await
}

pub async fn delete_article(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Tags for one article, in the order they were supplied at creation.
pub async fn article_tags(pool: &SqlitePool, article_id: i64) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT t.name FROM article_tags at \
         JOIN tags t ON t.id = at.tag_id \
         WHERE at.article_id = ? ORDER BY at.position ASC",
    )
    .bind(article_id)
    .fetch_all(pool)
    .await
}

/// Every known tag, alphabetical.
pub async fn all_tags(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT name FROM tags ORDER BY name ASC")
        .fetch_all(pool)
        .await
}

pub async fn favorite(
    pool: &SqlitePool,
    user_id: i64,
    article_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT OR IGNORE INTO favorites (user_id, article_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(article_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn unfavorite(
    pool: &SqlitePool,
    user_id: i64,
    article_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM favorites WHERE user_id = ? AND article_id = ?")
        .bind(user_id)
        .bind(article_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn is_favorited(
    pool: &SqlitePool,
    user_id: i64,
    article_id: i64,
) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM favorites WHERE user_id = ? AND article_id = ?",
    )
    .bind(user_id)
    .bind(article_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

pub async fn favorites_count(pool: &SqlitePool, article_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE article_id = ?")
        .bind(article_id)
        .fetch_one(pool)
        .await
}

/// Filtered listing, newest first, with the total count of matches before
/// pagination.
pub async fn list_articles(
    pool: &SqlitePool,
    filter: &ArticleFilter,
) -> Result<(Vec<Article>, i64), sqlx::Error> {
    let mut count_query = QueryBuilder::<Sqlite>::new(
        "SELECT COUNT(*) FROM articles a JOIN users u ON u.id = a.author_id WHERE 1=1",
    );
    push_filters(&mut count_query, filter);
    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT a.* FROM articles a JOIN users u ON u.id = a.author_id WHERE 1=1",
    );
    push_filters(&mut query, filter);
    query.push(" ORDER BY a.created_at DESC, a.id DESC LIMIT ");
    query.push_bind(filter.limit);
    query.push(" OFFSET ");
    query.push_bind(filter.offset);

    let articles = query.build_query_as::<Article>().fetch_all(pool).await?;
    Ok((articles, total))
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &ArticleFilter) {
    if let Some(tag) = &filter.tag {
        query.push(
            " AND a.id IN (SELECT at.article_id FROM article_tags at \
             JOIN tags t ON t.id = at.tag_id WHERE t.name = ",
        );
        query.push_bind(tag.clone());
        query.push(")");
    }

    if let Some(author) = &filter.author {
        query.push(" AND u.username = ");
        query.push_bind(author.clone());
    }

    if let Some(favorited) = &filter.favorited {
        query.push(
            " AND a.id IN (SELECT f.article_id FROM favorites f \
             JOIN users fu ON fu.id = f.user_id WHERE fu.username = ",
        );
        query.push_bind(favorited.clone());
        query.push(")");
    }
}

/// Articles authored by accounts the viewer follows, newest first.
pub async fn feed_articles(
    pool: &SqlitePool,
    viewer_id: i64,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Article>, i64), sqlx::Error> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM articles a \
         WHERE a.author_id IN (SELECT followed_id FROM follows WHERE follower_id = ?)",
    )
    .bind(viewer_id)
    .fetch_one(pool)
    .await?;

    let articles = sqlx::query_as::<_, Article>(
        "SELECT a.* FROM articles a \
         WHERE a.author_id IN (SELECT followed_id FROM follows WHERE follower_id = ?) \
         ORDER BY a.created_at DESC, a.id DESC LIMIT ? OFFSET ?",
    )
    .bind(viewer_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((articles, total))
}
