//! Banking server: resolves configuration from env (`.env` honored), ensures the schema, serves
//! common and banking routes.

use banking_api::{routes, seed::Seed, store, AppConfig, AppState, DataContext};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("banking_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(database = %config.data_source.url(), "resolved configuration");

    let pool = store::connect(&config.data_source).await?;
    store::ensure_schema(&pool).await?;

    if config.seed && store::is_empty(&pool).await? {
        Seed::new().apply(&DataContext::new(pool.clone())).await?;
    }

    let app = routes::app(AppState::new(pool), config.body_limit);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
