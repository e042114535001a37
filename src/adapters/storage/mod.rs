pub mod candidate_row;
pub mod memory;
pub mod postgres;

use crate::config::{AppConfig, StorageBackend};
use crate::core::{ConfigProvider, Storage};
use crate::utils::error::{IntakeError, Result};
use std::sync::Arc;

/// 依設定開啟儲存層，回傳整個行程共用的 handle
pub async fn open_storage(config: &AppConfig) -> Result<Arc<dyn Storage>> {
    match config.backend {
        StorageBackend::Postgres => {
            let url = config
                .database_url()
                .ok_or_else(|| IntakeError::MissingConfigError {
                    field: "database.url".to_string(),
                })?;
            let storage = postgres::PgStorage::connect(url, config.max_connections()).await?;
            Ok(Arc::new(storage))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            Ok(Arc::new(memory::MemoryStorage::new()))
        }
    }
}
