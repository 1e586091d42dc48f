//! Uploaded image files.
//!
//! Uploads are written under one directory with generated names
//! (`imagen-<uuid><.ext>`) and referenced from records as
//! `<public_prefix>/<file name>`. Only references tagged as uploads, whose
//! path resolves to a plain file directly inside the directory, are ever
//! deleted.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::product::{ImageRef, UPLOAD_FILE_PREFIX};
use crate::errors::ServiceError;

const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("image not owned by the catalog: {0}")]
    NotOwned(String),
    #[error("image cleanup failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct AssetDir {
    root: PathBuf,
    public_prefix: String,
}

impl AssetDir {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        let public_prefix = public_prefix.into().trim_matches('/').to_string();
        Self { root: root.into(), public_prefix }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Store an uploaded file under a generated name and return an owned reference to it.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<ImageRef, ServiceError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ServiceError::storage("create asset dir", e))?;

        let file_name = match extension_of(original_name) {
            Some(ext) => format!("{UPLOAD_FILE_PREFIX}{}.{ext}", Uuid::new_v4().simple()),
            None => format!("{UPLOAD_FILE_PREFIX}{}", Uuid::new_v4().simple()),
        };
        fs::write(self.root.join(&file_name), bytes)
            .await
            .map_err(|e| ServiceError::storage("write image", e))?;
        debug!(file = %file_name, size = bytes.len(), "stored uploaded image");

        let path = if self.public_prefix.is_empty() {
            file_name
        } else {
            format!("{}/{}", self.public_prefix, file_name)
        };
        Ok(ImageRef::upload(path))
    }

    /// On-disk location of an owned image.
    pub fn resolve(&self, image: &ImageRef) -> Result<PathBuf, AssetError> {
        if !image.is_owned() {
            return Err(AssetError::NotOwned(image.path.clone()));
        }
        let file_name = if self.public_prefix.is_empty() {
            Some(image.path.as_str())
        } else {
            image
                .path
                .strip_prefix(self.public_prefix.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
        };
        match file_name {
            Some(name) if is_plain_file_name(name) => Ok(self.root.join(name)),
            _ => Err(AssetError::NotOwned(image.path.clone())),
        }
    }

    /// Delete an owned image file.
    pub async fn remove(&self, image: &ImageRef) -> Result<(), AssetError> {
        let path = self.resolve(image)?;
        fs::remove_file(&path).await?;
        debug!(path = %path.display(), "removed image");
        Ok(())
    }

    /// Best-effort delete: external images are skipped, failures are only logged.
    pub async fn discard(&self, image: &ImageRef) {
        if !image.is_owned() {
            return;
        }
        if let Err(e) = self.remove(image).await {
            warn!(image = %image.path, error = %e, "failed to delete image");
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c: char| c == '/' || c == '\\')
}

fn extension_of(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > MAX_EXTENSION_LEN || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
