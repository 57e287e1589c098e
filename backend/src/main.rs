use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

mod analysis;
mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod llm;
mod models;
mod routes;

#[cfg(test)]
mod test_support;

use auth::rate_limit::RateLimiter;
use config::Config;
use llm::{ClaudeClient, ModelClient};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub chat: Arc<dyn ModelClient>,
    pub chat_limiter: RateLimiter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lifeline_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    // Database
    let db = db::create_pool(&config.database_url).await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    tracing::info!("Database migrations applied");

    if config.claude_api_key.is_empty() {
        tracing::warn!("CLAUDE_API_KEY not set, chat will answer 503");
    }
    let chat: Arc<dyn ModelClient> = Arc::new(ClaudeClient::from_config(&config)?);

    let chat_limiter = RateLimiter::new(
        config.chat_rate_limit,
        Duration::from_secs(config.chat_rate_window_secs),
    );
    auth::rate_limit::spawn_cleanup_worker(chat_limiter.clone());

    let state = AppState {
        db,
        config: config.clone(),
        chat,
        chat_limiter,
    };

    let app = routes::build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
