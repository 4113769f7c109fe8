use std::sync::Arc;

use masjid_api::app::{app, cors_layer};
use masjid_api::config;
use masjid_api::database::DatabaseManager;
use masjid_api::middleware::ContextServices;
use masjid_api::services::{PgRevocationStore, PgTenantStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting Masjid API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if masjid_api::is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("JWT_SECRET is not set; every bearer token will be rejected");
    }

    let pool = DatabaseManager::main_pool().await?;
    let services = ContextServices::from_config(
        config,
        Arc::new(PgTenantStore::new(pool.clone())),
        Some(Arc::new(PgRevocationStore::new(pool))),
    );

    let mut router = app(services);
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Masjid API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    DatabaseManager::close_all().await;
    Ok(())
}
