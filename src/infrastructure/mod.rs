//! Infrastructure Layer - 基础设施
//!
//! - memory: 有界 LRU 章节缓存
//! - persistence: 分层文件存储引擎
//! - adapters: 生成服务适配器（测试替身）

pub mod adapters;
pub mod memory;
pub mod persistence;
