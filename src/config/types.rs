//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 摘要配置
    #[serde(default)]
    pub summary: SummaryConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 存储根目录
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// 章节 LRU 缓存容量（条目数），0 表示禁用缓存
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_cache_capacity() -> usize {
    50
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// 摘要配置
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    /// 是否允许自动触发摘要生成
    #[serde(default = "default_auto_enabled")]
    pub auto_enabled: bool,

    /// 自动摘要的最小正文长度（字符数），低于阈值跳过
    #[serde(default = "default_min_auto_length")]
    pub min_auto_length: usize,
}

fn default_auto_enabled() -> bool {
    true
}

fn default_min_auto_length() -> usize {
    100
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            auto_enabled: default_auto_enabled(),
            min_auto_length: default_min_auto_length(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
