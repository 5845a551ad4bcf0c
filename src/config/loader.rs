//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `NOVELBOX_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `NOVELBOX_STORAGE__BASE_DIR=/data/novelbox`
/// - `NOVELBOX_STORAGE__CACHE_CAPACITY=100`
/// - `NOVELBOX_SUMMARY__MIN_AUTO_LENGTH=200`
/// - `NOVELBOX_LOG__LEVEL=debug`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("storage.base_dir", "data")?
        .set_default("storage.cache_capacity", 50)?
        .set_default("summary.auto_enabled", true)?
        .set_default("summary.min_auto_length", 100)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    builder = builder.add_source(
        Environment::with_prefix("NOVELBOX")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.storage.base_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Storage base dir cannot be empty".to_string(),
        ));
    }

    if config.summary.auto_enabled && config.summary.min_auto_length == 0 {
        return Err(ConfigError::ValidationError(
            "Minimum auto-summary length cannot be 0 when auto summary is enabled".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_passes_for_default_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_empty_base_dir() {
        let mut config = AppConfig::default();
        config.storage.base_dir = std::path::PathBuf::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_auto_length() {
        let mut config = AppConfig::default();
        config.summary.min_auto_length = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_auto_length_allowed_when_auto_disabled() {
        let mut config = AppConfig::default();
        config.summary.auto_enabled = false;
        config.summary.min_auto_length = 0;
        assert!(validate_config(&config).is_ok());
    }
}
