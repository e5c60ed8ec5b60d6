pub mod admin;
pub mod articles;
pub mod comments;
pub mod profiles;
pub mod users;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - API index
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Conduit API",
        "version": version,
        "description": "RealWorld blogging backend built with Rust (Axum)",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "users": "POST /api/users, POST /api/users/login (public - token acquisition)",
            "user": "GET|PUT /api/user (authenticated)",
            "profiles": "/api/profiles/:username[/follow] (mixed)",
            "articles": "/api/articles[/feed|/:slug] (mixed)",
            "comments": "/api/articles/:slug/comments[/:id] (mixed)",
            "tags": "GET /api/tags (public)",
            "admin": "/api/admin/* (restricted, requires admin role)",
        }
    }))
}

/// GET /health - Liveness check plus a database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("health check database ping failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
