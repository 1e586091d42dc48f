use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            log_format: default_log_format(),
        }
    }
}

/// Where the product document, uploaded images and admin page live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    /// URL path prefix written into `imagen` for stored uploads.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            assets_dir: default_assets_dir(),
            public_prefix: default_public_prefix(),
            frontend_dir: default_frontend_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3000 }
fn default_log_format() -> String { "compact".into() }
fn default_data_file() -> String { "assets/products.json".into() }
fn default_assets_dir() -> String { "assets".into() }
fn default_public_prefix() -> String { "assets".into() }
fn default_frontend_dir() -> String { "frontend".into() }
fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file when present, otherwise process environment; normalized and validated.
    /// A config file that exists but does not parse is an error.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path).map_err(|e| anyhow!("{path}: {e}"))?
        } else {
            Self::from_lookup(|key| std::env::var(key).ok())
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Build from environment-style lookups (`SERVER_HOST`, `SERVER_PORT`,
    /// `PRODUCTS_FILE`, `ASSETS_DIR`, `FRONTEND_DIR`, `LOG_FORMAT`).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();
        if let Some(host) = lookup("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(threads) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(threads);
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            cfg.server.log_format = format;
        }
        if let Some(file) = lookup("PRODUCTS_FILE") {
            cfg.storage.data_file = file;
        }
        if let Some(dir) = lookup("ASSETS_DIR") {
            cfg.storage.assets_dir = dir;
        }
        if let Some(dir) = lookup("FRONTEND_DIR") {
            cfg.storage.frontend_dir = dir;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.data_file.trim().is_empty() {
            return Err(anyhow!("storage.data_file is empty"));
        }
        if self.assets_dir.trim().is_empty() {
            return Err(anyhow!("storage.assets_dir is empty"));
        }
        let prefix = self.public_prefix.trim_matches('/');
        if prefix.is_empty() || prefix.contains("..") {
            return Err(anyhow!("storage.public_prefix must be a non-empty path without '..'"));
        }
        if self.max_upload_bytes == 0 {
            return Err(anyhow!("storage.max_upload_bytes must be > 0"));
        }
        Ok(())
    }
}
