use async_trait::async_trait;

use crate::catalog::product::{ImageRef, Product, ProductFields};
use crate::errors::ServiceError;

/// Trait abstraction for product record storage.
/// The HTTP layer only talks to this; `ProductStore` is the JSON file implementation.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, ServiceError>;
    async fn get(&self, id: u64) -> Result<Product, ServiceError>;
    async fn create(&self, fields: ProductFields, image: Option<ImageRef>) -> Result<Product, ServiceError>;
    async fn update(&self, id: u64, fields: ProductFields, image: Option<ImageRef>) -> Result<Product, ServiceError>;
    async fn delete(&self, id: u64) -> Result<(), ServiceError>;
}
