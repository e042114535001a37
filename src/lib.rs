pub mod adapters;
pub mod client;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::{build_router, AppState};
pub use adapters::storage::{memory::MemoryStorage, open_storage, postgres::PgStorage};
pub use config::{AppConfig, StorageBackend};
pub use crate::core::ingest::IngestEngine;
pub use utils::error::{IntakeError, Result};
