use std::{path::PathBuf, sync::Arc};

use tracing::{debug, info};

use crate::assets::AssetDir;
use crate::catalog::product::{ImageRef, NewProduct, Product, ProductFields, ProductPatch};
use crate::catalog::repository::ProductCatalog;
use crate::errors::ServiceError;
use crate::storage::json_doc_store::JsonDocStore;

/// File storage for product records: one JSON array document plus the
/// uploaded images the records own.
pub struct ProductStore {
    doc: JsonDocStore<Product>,
    assets: AssetDir,
}

impl ProductStore {
    /// Open the document at `path`, creating an empty one if missing.
    pub async fn new<P: Into<PathBuf>>(path: P, assets: AssetDir) -> Result<Arc<Self>, ServiceError> {
        let doc = JsonDocStore::new(path).await?;
        Ok(Arc::new(Self { doc, assets }))
    }

    pub fn assets(&self) -> &AssetDir {
        &self.assets
    }

    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        let products = self.doc.read_all().await?;
        debug!(count = products.len(), "listed products");
        Ok(products)
    }

    pub async fn get(&self, id: u64) -> Result<Product, ServiceError> {
        self.doc
            .read_all()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ServiceError::not_found("product"))
    }

    /// Append a record with id = max + 1. The image is mandatory; a stored
    /// upload is discarded again if the record cannot be created.
    pub async fn create(&self, fields: ProductFields, image: Option<ImageRef>) -> Result<Product, ServiceError> {
        let Some(image) = image else {
            return Err(ServiceError::Validation("image required".into()));
        };
        let created = self.insert(fields, image.clone()).await;
        if created.is_err() {
            self.assets.discard(&image).await;
        }
        created
    }

    async fn insert(&self, fields: ProductFields, image: ImageRef) -> Result<Product, ServiceError> {
        let input = NewProduct::from_fields(fields)?;
        let product = self
            .doc
            .update(|products| {
                let next_id = products
                    .iter()
                    .map(|p| p.id)
                    .max()
                    .unwrap_or(0)
                    .checked_add(1)
                    .ok_or_else(|| ServiceError::Storage("product id space exhausted".into()))?;
                let product = input.into_product(next_id, image);
                products.push(product.clone());
                Ok(product)
            })
            .await?;
        info!(id = product.id, nombre = %product.nombre, "product created");
        Ok(product)
    }

    /// Merge present fields into the record and optionally swap its image.
    /// The superseded image is deleted after the document is written.
    pub async fn update(&self, id: u64, fields: ProductFields, image: Option<ImageRef>) -> Result<Product, ServiceError> {
        match self.merge(id, fields, image.clone()).await {
            Ok((product, replaced)) => {
                if let Some(old) = replaced {
                    self.assets.discard(&old).await;
                }
                Ok(product)
            }
            Err(e) => {
                if let Some(new) = &image {
                    self.assets.discard(new).await;
                }
                Err(e)
            }
        }
    }

    async fn merge(
        &self,
        id: u64,
        fields: ProductFields,
        image: Option<ImageRef>,
    ) -> Result<(Product, Option<ImageRef>), ServiceError> {
        let patch = ProductPatch::from_fields(fields)?;
        let (product, replaced) = self
            .doc
            .update(|products| {
                let product = products
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(|| ServiceError::not_found("product"))?;
                patch.apply(product);
                let replaced = image.and_then(|new| product.replace_image(new));
                Ok((product.clone(), replaced))
            })
            .await?;
        info!(id, image_replaced = replaced.is_some(), "product updated");
        Ok((product, replaced))
    }

    /// Remove the record, then its owned image.
    pub async fn delete(&self, id: u64) -> Result<(), ServiceError> {
        let removed = self
            .doc
            .update(|products| {
                let pos = products
                    .iter()
                    .position(|p| p.id == id)
                    .ok_or_else(|| ServiceError::not_found("product"))?;
                Ok(products.remove(pos))
            })
            .await?;
        info!(id, "product deleted");
        if let Some(image) = removed.image() {
            self.assets.discard(&image).await;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductCatalog for ProductStore {
    async fn list(&self) -> Result<Vec<Product>, ServiceError> { self.list().await }
    async fn get(&self, id: u64) -> Result<Product, ServiceError> { self.get(id).await }
    async fn create(&self, fields: ProductFields, image: Option<ImageRef>) -> Result<Product, ServiceError> { self.create(fields, image).await }
    async fn update(&self, id: u64, fields: ProductFields, image: Option<ImageRef>) -> Result<Product, ServiceError> { self.update(id, fields, image).await }
    async fn delete(&self, id: u64) -> Result<(), ServiceError> { self.delete(id).await }
}
