pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{IntakeError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

/// 合併後的伺服器設定：預設值 < TOML 檔 < 命令列參數
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    pub fn from_toml(file: &TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: file
                .bind()
                .map(str::to_string)
                .unwrap_or(defaults.bind_addr),
            backend: file.backend().unwrap_or(defaults.backend),
            database_url: file.database_url().map(str::to_string),
            max_connections: file.max_connections().unwrap_or(defaults.max_connections),
            allowed_origins: file
                .allowed_origins()
                .map(<[String]>::to_vec)
                .unwrap_or(defaults.allowed_origins),
        }
    }
}

impl ConfigProvider for AppConfig {
    fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    fn max_connections(&self) -> u32 {
        self.max_connections
    }

    fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_bind_addr("server.bind", &self.bind_addr)?;
        validation::validate_positive_number(
            "database.max_connections",
            self.max_connections as usize,
            1,
        )?;

        if self.backend == StorageBackend::Postgres {
            let url = validation::validate_required_field("database.url", &self.database_url)?;
            validation::validate_database_url("database.url", url)?;
        }

        for origin in &self.allowed_origins {
            validation::validate_url("server.allowed_origins", origin)?;
        }

        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "candidate-intake")]
#[command(about = "HTTP backend for bulk candidate uploads, assignments and employee summaries")]
pub struct CliConfig {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Socket address to listen on (overrides `server.bind`)
    #[arg(long)]
    pub bind: Option<String>,

    /// PostgreSQL connection string (falls back to `DATABASE_URL`)
    #[arg(long)]
    pub database_url: Option<String>,

    #[arg(long, value_enum)]
    pub storage: Option<StorageBackend>,

    #[arg(long)]
    pub max_connections: Option<u32>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn resolve(&self) -> Result<AppConfig> {
        let file = match &self.config {
            Some(path) => TomlConfig::from_file(path).map_err(|e| IntakeError::ConfigError {
                message: format!("failed to load '{}': {}", path, e),
            })?,
            None => TomlConfig::default(),
        };

        let mut config = AppConfig::from_toml(&file);

        // 命令列覆蓋
        if let Some(bind) = &self.bind {
            config.bind_addr = bind.clone();
        }
        if let Some(backend) = self.storage {
            config.backend = backend;
        }
        if let Some(url) = &self.database_url {
            config.database_url = Some(url.clone());
        }
        if let Some(max) = self.max_connections {
            config.max_connections = max;
        }

        if config.database_url.is_none() {
            config.database_url = std::env::var("DATABASE_URL").ok();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_need_database_url_for_postgres() {
        let config = AppConfig::default();
        assert!(matches!(
            config.validate(),
            Err(IntakeError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_memory_backend_validates_without_database() {
        let config = AppConfig {
            backend: StorageBackend::Memory,
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_keeps_defaults_for_missing_sections() {
        let file = TomlConfig::from_toml_str("[database]\nmax_connections = 3\n").unwrap();
        let config = AppConfig::from_toml(&file);

        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.backend, StorageBackend::Postgres);
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_invalid_origin_fails_validation() {
        let config = AppConfig {
            backend: StorageBackend::Memory,
            allowed_origins: vec!["not an origin".to_string()],
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_flags_override_file() {
        use clap::Parser;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[server]\nbind = \"127.0.0.1:4000\"\n[database]\nbackend = \"postgres\"\n")
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "candidate-intake",
            "--config",
            path.as_str(),
            "--bind",
            "127.0.0.1:5000",
            "--storage",
            "memory",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:5000");
        assert_eq!(config.backend, StorageBackend::Memory);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_missing_config_file_is_config_error() {
        use clap::Parser;

        let cli = CliConfig::parse_from(["candidate-intake", "--config", "/nonexistent/intake.toml"]);
        assert!(matches!(cli.resolve(), Err(IntakeError::ConfigError { .. })));
    }
}
