use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::env::ensure_env;
use configs::{AppConfig, ServerConfig, StorageConfig};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};
use service::{
    assets::AssetDir,
    catalog::{ProductCatalog, ProductStore},
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Open the product document and asset directory named by `storage`.
pub async fn build_state(storage: &StorageConfig) -> anyhow::Result<ServerState> {
    let assets = AssetDir::new(&storage.assets_dir, &storage.public_prefix);
    let store = ProductStore::new(&storage.data_file, assets.clone()).await?;
    let catalog: Arc<dyn ProductCatalog> = store;
    Ok(ServerState { catalog, assets: Arc::new(assets) })
}

/// Check directories, open storage and assemble the router.
pub async fn build_app(storage: &StorageConfig) -> anyhow::Result<Router> {
    ensure_env(&storage.frontend_dir, &storage.assets_dir).await?;
    let state = build_state(storage).await?;
    Ok(routes::build_router(state, storage, build_cors()))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, draining connections");
    }
}

/// Public entry: build the app and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg.storage).await?;

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, data_file = %cfg.storage.data_file, "starting catalog admin server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
