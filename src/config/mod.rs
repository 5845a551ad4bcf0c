//! Configuration - 配置管理

pub mod loader;
pub mod types;

pub use loader::{load_config, load_config_from_path, ConfigError};
pub use types::{AppConfig, LogConfig, StorageConfig, SummaryConfig};
