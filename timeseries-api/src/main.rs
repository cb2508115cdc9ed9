mod config;
mod error;
mod model;
mod query;
mod server;
mod state;
mod store;
mod timeseries;
#[cfg(test)]
mod testing;

use config::Config;
use state::AppState;
use std::{net::SocketAddr, sync::Arc};
use store::ClickHouseStore;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config_path =
        std::env::var("TIMESERIES_API_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let cfg = Config::from_file(&config_path)?;

    // Fatal if the store is unreachable; there is no retry.
    let store = ClickHouseStore::connect(&cfg.clickhouse)
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to ClickHouse: {}", e))?;

    let state = Arc::new(AppState::new(Arc::new(store), &cfg));
    let app = server::build_router(state, &cfg)?;

    let addr: SocketAddr = cfg.listen().parse()?;
    info!(%addr, origin = cfg.allowed_origin(), "Starting timeseries-api");

    let server = axum::Server::bind(&addr).serve(app.into_make_service());

    let graceful = server.with_graceful_shutdown(shutdown_signal());
    graceful.await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
