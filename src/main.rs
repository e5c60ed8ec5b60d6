use anyhow::Context;
use tracing_subscriber::EnvFilter;

use conduit_api::config::{AppConfig, Environment};
use conduit_api::database;
use conduit_api::routes;
use conduit_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("conduit_api=debug,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Conduit API in {:?} mode", config.environment);

    // The development default secret must never sign production tokens
    if matches!(config.environment, Environment::Production) && config.security.jwt_secret.is_empty()
    {
        anyhow::bail!("SECURITY_JWT_SECRET must be set in production");
    }

    let pool = database::connect(&config.database)
        .await
        .context("failed to open database")?;
    database::init_schema(&pool)
        .await
        .context("failed to apply database schema")?;

    let app = routes::app(AppState::new(pool, config));

    // Allow tests or deployments to override port via env
    let port = std::env::var("CONDUIT_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    println!("🚀 Conduit API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
