//! Content Fingerprint - 章节内容指纹
//!
//! 基于 SHA-256 的内容哈希，用于检测章节正文是否发生变化。
//! 指纹会被持久化到 AI 上下文中并跨进程比较，因此必须稳定（无随机性）。

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// 内容指纹 - 小写十六进制的 SHA-256 摘要
///
/// 不变量:
/// - 相同的正文总是产生相同的指纹（跨进程、跨重启）
/// - 空正文产生定义良好的指纹，不是错误
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// 计算章节正文的指纹
    pub fn from_text(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
