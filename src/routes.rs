use axum::routing::get;
use axum::{middleware, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::middleware::auth::resolve_identity;
use crate::state::AppState;

/// Assemble the application router around a shared [`AppState`].
///
/// Identity resolution wraps only the `/api` groups, so `/` and `/health`
/// answer regardless of what the Authorization header holds.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(user_routes())
        .merge(profile_routes())
        .merge(article_routes())
        .merge(admin_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ));

    let mut app = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(api)
        // Global middleware
        .layer(CorsLayer::permissive());

    if state.config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn user_routes() -> Router<AppState> {
    use axum::routing::post;
    use crate::handlers::users;

    Router::new()
        // Registration and login are the token acquisition points
        .route("/api/users", post(users::register))
        .route("/api/users/login", post(users::login))
        // Current account
        .route("/api/user", get(users::current_user).put(users::update_user))
}

fn profile_routes() -> Router<AppState> {
    use axum::routing::post;
    use crate::handlers::profiles;

    Router::new()
        .route("/api/profiles/:username", get(profiles::get_profile))
        .route(
            "/api/profiles/:username/follow",
            post(profiles::follow).delete(profiles::unfollow),
        )
}

fn article_routes() -> Router<AppState> {
    use axum::routing::{delete, post};
    use crate::handlers::{articles, comments};

    Router::new()
        // Collection-level operations
        .route(
            "/api/articles",
            get(articles::list_articles).post(articles::create_article),
        )
        .route("/api/articles/feed", get(articles::feed))
        // Single-article operations
        .route(
            "/api/articles/:slug",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        .route(
            "/api/articles/:slug/favorite",
            post(articles::favorite).delete(articles::unfavorite),
        )
        // Comments
        .route(
            "/api/articles/:slug/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/api/articles/:slug/comments/:id",
            delete(comments::delete_comment),
        )
        // Tag index
        .route("/api/tags", get(articles::tags))
}

fn admin_routes() -> Router<AppState> {
    use crate::handlers::admin;

    Router::new().route("/api/admin/users", get(admin::list_users))
}
