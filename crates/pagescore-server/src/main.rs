use std::env;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use pagescore_core::tracing::init_tracing;
use pagescore_core::PageScoreConfig;
use pagescore_engine::AuditService;
use pagescore_server::{internal_router, router, AppState};
use pagescore_storage::AuditStorageEngine;

const CONFIG_PATH_ENV: &str = "PAGESCORE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "pagescore.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = PageScoreConfig::load(Path::new(&config_path))
        .with_context(|| format!("loading {config_path}"))?;
    init_tracing(&config.logging);

    let db_path = config.storage.effective_db_path();
    let storage = AuditStorageEngine::open(Path::new(db_path), config.storage.effective_read_pool_size())
        .with_context(|| format!("opening database {db_path}"))?;
    let service = AuditService::new(Arc::new(storage), &config);
    let state = AppState::new(service);

    let public_addr = parse_bind(config.server.effective_bind())?;
    let internal_addr = parse_bind(config.server.effective_internal_bind())?;
    let public = tokio::net::TcpListener::bind(public_addr).await?;
    let internal = tokio::net::TcpListener::bind(internal_addr).await?;

    info!(%public_addr, %internal_addr, db_path, "pagescore-server listening");
    tokio::try_join!(
        axum::serve(public, router(state.clone())).into_future(),
        axum::serve(internal, internal_router(state)).into_future(),
    )?;
    Ok(())
}

fn parse_bind(raw: &str) -> anyhow::Result<SocketAddr> {
    raw.parse()
        .with_context(|| format!("invalid bind address {raw}"))
}
