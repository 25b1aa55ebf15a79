use std::sync::Arc;

use product_recs_api::{
    api::{create_router, AppState},
    config::Config,
    db,
    services::{InMemorySnapshot, PgSnapshotProvider, SnapshotProvider},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let provider: Arc<dyn SnapshotProvider> = match &config.snapshot_file {
        Some(path) => Arc::new(InMemorySnapshot::from_file(path)?),
        None => {
            let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
            if config.run_migrations {
                db::run_migrations(&pool).await?;
            }
            Arc::new(PgSnapshotProvider::new(pool))
        }
    };

    tracing::info!(provider = provider.name(), "Snapshot provider ready");

    let address = config.bind_address();
    let app = create_router(AppState::new(provider, config));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
