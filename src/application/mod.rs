//! Application Layer - 应用层
//!
//! - error: 统一的结果与错误类型
//! - ports: 外部协作方的端口定义（LLM 生成契约）
//! - services: 摘要协调器与数据迁移

pub mod error;
pub mod ports;
pub mod services;

pub use error::{StorageError, StorageResult};
