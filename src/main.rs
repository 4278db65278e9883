use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use mdm_backend::auth::TokenIssuer;
use mdm_backend::config::AppConfig;
use mdm_backend::context::AppContext;
use mdm_backend::database::{DatabaseManager, PgDeviceRepository, PgUserRepository};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL and JWT_SECRET
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!("Fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    tracing::info!("Starting MDM backend in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }

    let tokens = TokenIssuer::from_config(&config.security)?;
    let ctx = AppContext::new(
        Arc::new(PgDeviceRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
        tokens,
    );

    let app = mdm_backend::app(ctx, &config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("MDM backend listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
