//! Service layer for the product catalog.
//! - `catalog`: product records and the file-backed record store.
//! - `assets`: uploaded image files owned by the store.
//! - `storage`: the JSON document read-modify-write primitive.

pub mod errors;
pub mod storage;
pub mod assets;
pub mod catalog;
