use std::path::Path;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

/// Which item store backs the user table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
    Dynamodb,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "dynamodb" => Ok(Self::Dynamodb),
            other => Err(anyhow!("unknown store backend `{other}` (expected memory, file or dynamodb)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_data_path")]
    pub data_path: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            table: default_table(),
            data_path: default_data_path(),
            page_size: default_page_size(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_table() -> String { "users".into() }
fn default_data_path() -> String { "data/users.json".into() }
fn default_page_size() -> usize { 100 }

pub const MAX_PAGE_SIZE: usize = 1000;

/// `CONFIG_PATH`, or `config.toml`.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// Load `path` when it exists; a missing file yields the defaults.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
    if Path::new(path).exists() {
        load_from_file(path)
    } else {
        Ok(AppConfig::default())
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from file when present (defaults otherwise), apply env overrides, validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_or_default(&config_path())?;
        cfg.apply_env_overrides()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.server.port = port.parse().map_err(|e| anyhow!("SERVER_PORT `{port}`: {e}"))?;
        }
        if let Ok(backend) = std::env::var("STORE_BACKEND") {
            self.store.backend = backend.parse()?;
        }
        if let Ok(table) = std::env::var("STORE_TABLE") {
            self.store.table = table;
        }
        if let Ok(path) = std::env::var("STORE_DATA_PATH") {
            self.store.data_path = path;
        }
        if let Ok(size) = std::env::var("STORE_PAGE_SIZE") {
            self.store.page_size = size.parse().map_err(|e| anyhow!("STORE_PAGE_SIZE `{size}`: {e}"))?;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if matches!(self.worker_threads, None | Some(0)) {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(anyhow!("store.table is empty"));
        }
        if self.backend == StoreBackend::File && self.data_path.trim().is_empty() {
            return Err(anyhow!("store.data_path is required for the file backend"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(anyhow!("store.page_size must be within 1..={MAX_PAGE_SIZE}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() -> Result<()> {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [store]
            backend = "file"
            table = "people"
            data_path = "/tmp/people.json"
            page_size = 25
            "#,
        )?;
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.store.backend, StoreBackend::File);
        assert_eq!(cfg.store.table, "people");
        assert_eq!(cfg.store.page_size, 25);
        Ok(())
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() -> Result<()> {
        let mut cfg: AppConfig = toml::from_str("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.store.table, "users");
        assert_eq!(cfg.store.page_size, 100);
        Ok(())
    }

    #[test]
    fn rejects_out_of_range_page_size() {
        let mut cfg = AppConfig::default();
        cfg.store.page_size = 0;
        assert!(cfg.normalize_and_validate().is_err());
        cfg.store.page_size = MAX_PAGE_SIZE + 1;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn rejects_blank_table_and_zero_port() {
        let mut cfg = AppConfig::default();
        cfg.store.table = "  ".into();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!("DynamoDB".parse::<StoreBackend>().unwrap(), StoreBackend::Dynamodb);
        assert_eq!(" file ".parse::<StoreBackend>().unwrap(), StoreBackend::File);
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn load_from_file_reads_toml() -> Result<()> {
        let path = std::env::temp_dir().join(format!("configs_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[store]\nbackend = \"memory\"\npage_size = 7\n")?;
        let cfg = load_from_file(path.to_str().unwrap())?;
        assert_eq!(cfg.store.page_size, 7);
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn missing_file_loads_defaults() -> Result<()> {
        let path = std::env::temp_dir().join(format!("configs_missing_{}.toml", uuid::Uuid::new_v4()));
        let cfg = load_or_default(path.to_str().unwrap())?;
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        Ok(())
    }

    #[test]
    fn present_file_is_loaded_not_defaulted() -> Result<()> {
        let path = std::env::temp_dir().join(format!("configs_present_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]
port = 9100
")?;
        let cfg = load_or_default(path.to_str().unwrap())?;
        assert_eq!(cfg.server.port, 9100);
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn server_section_with_only_worker_threads_uses_defaults() -> Result<()> {
        let mut cfg: AppConfig = toml::from_str("[server]
worker_threads = 2
")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.worker_threads, Some(2));
        Ok(())
    }
}
