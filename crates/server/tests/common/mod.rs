#![allow(dead_code)]

use std::path::PathBuf;

use configs::StorageConfig;
use uuid::Uuid;

pub const BOUNDARY: &str = "catalog-test-boundary";

/// Storage rooted in a fresh temp dir per test.
pub struct TestStorage {
    pub root: PathBuf,
    pub config: StorageConfig,
}

impl TestStorage {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("catalog_api_{}", Uuid::new_v4()));
        let path = |p: &str| root.join(p).to_string_lossy().into_owned();
        let config = StorageConfig {
            data_file: path("assets/products.json"),
            assets_dir: path("assets"),
            public_prefix: "assets".into(),
            frontend_dir: path("frontend"),
            max_upload_bytes: 1024 * 1024,
        };
        Self { root, config }
    }

    /// Path on disk for an `imagen` value such as `assets/imagen-<uuid>.png`.
    pub fn image_path(&self, imagen: &str) -> PathBuf {
        self.root.join(imagen)
    }

    /// Number of generated upload files currently in the asset directory.
    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(self.root.join("assets"))
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.file_name().to_string_lossy().starts_with("imagen-"))
                    .count()
            })
            .unwrap_or(0)
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.root).await;
    }
}

/// Hand-built `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"imagen\"; filename=\"{file_name}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
