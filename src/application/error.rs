//! 应用层错误定义
//!
//! 存储引擎与各服务统一的结果类型。所有公开操作返回
//! `StorageResult`，错误不会越过本层边界向外抛出 panic。

use thiserror::Error;

use super::ports::LlmError;

/// 存储与协调层错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 必需的实体文件缺失
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// 读写/权限错误
    #[error("IO error: {0}")]
    Io(String),

    /// 存储数据格式损坏
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 外部生成服务调用失败
    #[error("External service error: {0}")]
    ExternalService(#[from] LlmError),

    /// 索引与章节文件不一致（非致命，可重试）
    #[error("Consistency warning: {0}")]
    Consistency(String),
}

impl StorageError {
    /// 创建 NotFound 错误
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// 统一结果别名
pub type StorageResult<T> = Result<T, StorageError>;
