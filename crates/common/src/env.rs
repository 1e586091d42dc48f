//! Startup checks for the catalog's on-disk layout.

use tracing::warn;

/// Create the image upload directory if needed. A missing admin page
/// directory is only reported: the product API works without it.
pub async fn ensure_env(frontend_dir: &str, assets_dir: &str) -> anyhow::Result<()> {
    match tokio::fs::metadata(frontend_dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => warn!(%frontend_dir, "admin page path is not a directory; GET / will 404"),
        Err(_) => warn!(%frontend_dir, "admin page directory missing; GET / will 404"),
    }
    tokio::fs::create_dir_all(assets_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create image upload directory {assets_dir}: {e}"))?;
    Ok(())
}
