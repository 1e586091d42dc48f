//! Product records and the file-backed record store.

pub mod product;
pub mod repository;
pub mod store;

pub use product::{ImageOrigin, ImageRef, Product, ProductFields};
pub use repository::ProductCatalog;
pub use store::ProductStore;
