#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use conduit_api::config::AppConfig;
use conduit_api::database;
use conduit_api::routes;
use conduit_api::state::AppState;

/// Router over a private in-memory database. Each call gets a fresh one,
/// so tests never see each other's data.
pub async fn test_app() -> Result<Router> {
    Ok(test_app_with_pool().await?.0)
}

/// Same, but also hands back the pool for tests that reach into the
/// database directly (role promotion, token minting).
pub async fn test_app_with_pool() -> Result<(Router, SqlitePool)> {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "test-secret".to_string();
    // Low cost keeps the hashing out of the test runtime
    config.security.bcrypt_cost = 4;

    let pool = database::connect_memory().await?;
    let state = AppState::new(pool.clone(), config);
    Ok((routes::app(state), pool))
}

/// Fire one request at the app and decode the JSON body. Empty bodies
/// (204s) come back as `Value::Null`.
pub async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let raw = body.map(|body| body.to_string());
    raw_request(app, method, path, token, raw.as_deref()).await
}

/// Variant that sends the body verbatim, for malformed-payload tests.
pub async fn raw_request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();

    let bytes = response.into_body().collect().await?.to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .with_context(|| format!("non-JSON body from {} {}", method, path))?
    };

    Ok((status, json))
}

/// Register an account and hand back its token. The password is always
/// "password".
pub async fn register_ok(app: &Router, username: &str, email: &str) -> Result<String> {
    let (status, body) = request(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({
            "user": {"username": username, "email": email, "password": "password"}
        })),
    )
    .await?;

    anyhow::ensure!(
        status == StatusCode::CREATED,
        "register failed: {} {}",
        status,
        body
    );

    let token = body["user"]["token"]
        .as_str()
        .context("token missing from register response")?
        .to_string();
    Ok(token)
}

/// Create an article under the given token and hand back its slug.
pub async fn create_article_ok(
    app: &Router,
    token: &str,
    title: &str,
    tags: &[&str],
) -> Result<String> {
    let (status, body) = request(
        app,
        "POST",
        "/api/articles",
        Some(token),
        Some(json!({
            "article": {
                "title": title,
                "description": "Test description",
                "body": "Test body.",
                "tagList": tags,
            }
        })),
    )
    .await?;

    anyhow::ensure!(
        status == StatusCode::CREATED,
        "create article failed: {} {}",
        status,
        body
    );

    let slug = body["article"]["slug"]
        .as_str()
        .context("slug missing from article response")?
        .to_string();
    Ok(slug)
}

/// Flip an account to the admin role directly in the database. Role
/// assignment has no API surface; operators grant it out of band.
pub async fn promote_to_admin(pool: &SqlitePool, username: &str) -> Result<()> {
    sqlx::query("UPDATE users SET role = 'admin' WHERE username = ?")
        .bind(username)
        .execute(pool)
        .await?;
    Ok(())
}

/// Look up an account id, for tests that mint their own tokens.
pub async fn user_id(pool: &SqlitePool, username: &str) -> Result<i64> {
    let id = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(id)
}
