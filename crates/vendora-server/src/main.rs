//! Vendora Server — application entry point.

use tracing_subscriber::EnvFilter;
use vendora_db::{DbConfig, DbManager};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("vendora=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Vendora server...");

    let config = DbConfig {
        url: std::env::var("VENDORA_DB_URL").unwrap_or_else(|_| "127.0.0.1:8000".into()),
        ..DbConfig::default()
    };

    let manager = match DbManager::connect(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to SurrealDB");
            return;
        }
    };

    if let Err(e) = vendora_db::run_migrations(manager.client()).await {
        tracing::error!(error = %e, "migrations failed");
        return;
    }

    // TODO: mount the storefront and admin HTTP gateways
    tracing::info!("Vendora server stopped.");
}
