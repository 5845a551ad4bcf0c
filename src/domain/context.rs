//! AI Context - 章节派生摘要状态
//!
//! 每章一条持久化记录，保存摘要、生成时所用正文的指纹以及处理状态。
//! "不存在"状态由文件缺失表示（加载返回 None），不设枚举变体，
//! 避免从默认值伪造出 completed 记录。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fingerprint::Fingerprint;

/// AI 处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProcessingStatus {
    Processing,
    Completed,
    Failed,
}

/// 章节 AI 上下文
///
/// 不变量: status 为 Completed 时，content_hash 等于产生 summary
/// 的那份正文的指纹；不相等即为过期，需要重新生成。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiContext {
    pub chapter_id: String,
    pub content_hash: Fingerprint,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub summary_updated_at: Option<DateTime<Utc>>,
    pub ai_processing_status: AiProcessingStatus,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub last_error_time: Option<DateTime<Utc>>,
    /// 最近一次写入本记录的时间，由存储引擎盖章
    pub last_processed_at: DateTime<Utc>,
}

impl AiContext {
    /// 外部生成调用前的过渡状态（清空旧摘要）
    pub fn processing(chapter_id: impl Into<String>, content_hash: Fingerprint) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            content_hash,
            summary: String::new(),
            summary_updated_at: None,
            ai_processing_status: AiProcessingStatus::Processing,
            last_error: None,
            last_error_time: None,
            last_processed_at: Utc::now(),
        }
    }

    /// 生成成功的终态
    pub fn completed(
        chapter_id: impl Into<String>,
        content_hash: Fingerprint,
        summary: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            chapter_id: chapter_id.into(),
            content_hash,
            summary: summary.into(),
            summary_updated_at: Some(now),
            ai_processing_status: AiProcessingStatus::Completed,
            last_error: None,
            last_error_time: None,
            last_processed_at: now,
        }
    }

    /// 生成失败的终态，保留错误详情供 UI 展示
    pub fn failed(
        chapter_id: impl Into<String>,
        content_hash: Fingerprint,
        error: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            chapter_id: chapter_id.into(),
            content_hash,
            summary: String::new(),
            summary_updated_at: None,
            ai_processing_status: AiProcessingStatus::Failed,
            last_error: Some(error.into()),
            last_error_time: Some(now),
            last_processed_at: now,
        }
    }

    /// 对给定正文而言，本记录是否为可直接复用的摘要
    pub fn is_fresh_for(&self, hash: &Fingerprint) -> bool {
        self.ai_processing_status == AiProcessingStatus::Completed && self.content_hash == *hash
    }
}
