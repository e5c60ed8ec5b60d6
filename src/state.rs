use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenCodec;
use crate::config::AppConfig;

/// Shared application state, built once at startup and threaded through the
/// router. Everything here is cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub tokens: TokenCodec,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        let tokens = TokenCodec::new(
            &config.security.jwt_secret,
            config.security.jwt_expiry_hours,
        );

        Self {
            pool,
            tokens,
            config: Arc::new(config),
        }
    }
}
