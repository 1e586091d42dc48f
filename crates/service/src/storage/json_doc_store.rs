use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// JSON file-backed document holding an ordered collection of `T`.
///
/// Nothing is cached: every call reads the file fresh, and mutations rewrite
/// the whole document. Calls within one process are serialized through the
/// lock (readers shared, mutations exclusive) so a read-modify-write cycle
/// never interleaves with another one. Other processes writing the same file
/// are not coordinated with.
pub struct JsonDocStore<T> {
    file_path: PathBuf,
    lock: RwLock<()>,
    _items: PhantomData<fn() -> T>,
}

impl<T> JsonDocStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Open the document at `path`. Creates it (and its parent directory) with an
    /// empty array if missing; an existing file is left untouched even if malformed.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        if fs::metadata(&file_path).await.is_err() {
            fs::write(&file_path, b"[]")
                .await
                .map_err(|e| ServiceError::storage("create document", e))?;
        }

        Ok(Self { file_path, lock: RwLock::new(()), _items: PhantomData })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn load(&self) -> Result<Vec<T>, ServiceError> {
        let bytes = fs::read(&self.file_path)
            .await
            .map_err(|e| ServiceError::storage("read document", e))?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::storage("parse document", e))
    }

    async fn save(&self, items: &[T]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(items).map_err(|e| ServiceError::storage("encode document", e))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::storage("write document", e))?;
        Ok(())
    }

    /// Read the whole collection as persisted.
    pub async fn read_all(&self) -> Result<Vec<T>, ServiceError> {
        let _guard = self.lock.read().await;
        self.load().await
    }

    /// Read, apply `f`, and write the collection back.
    ///
    /// When `f` fails nothing is written and the in-memory copy is dropped.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let _guard = self.lock.write().await;
        let mut items = self.load().await?;
        let out = f(&mut items)?;
        self.save(&items).await?;
        Ok(out)
    }
}
