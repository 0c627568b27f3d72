//! Server: loads schema documents, migrates storage, then serves the collection API.
//!
//! Run from repo root: `cargo run -p collection-proxy-server`

use collection_proxy::{app, apply_migrations, connect, ensure_database_exists, load_registry, AppState, ProxySettings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("collection_proxy=info,collection_proxy_server=info")),
        )
        .init();

    let settings = ProxySettings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = connect(&settings.database_url, settings.max_connections).await?;
    tracing::info!(database = %settings.database_url, "connected to the database");

    let registry = load_registry(&settings.schema_dir, &settings.schema_exclude).await?;
    let report = apply_migrations(&pool, &registry).await;
    let failed = report.failures().count();
    if failed > 0 {
        tracing::warn!(failed, total = report.outcomes.len(), "some collections were not migrated");
    }

    let state = AppState::new(pool, registry);
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state, settings.body_limit))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
