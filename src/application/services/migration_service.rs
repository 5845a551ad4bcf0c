//! Migration Service - 旧版数据迁移
//!
//! 把旧版扁平存储（一个列表内联全部章节正文）一次性翻译成分层
//! 存储结构。只使用存储引擎的公开写操作；章节索引完全由这些写入
//! 重建。迁移后提供独立的只读校验，逐字节比对章节正文。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::error::StorageResult;
use crate::domain::{
    word_count, AiConfig, Chapter, NovelMetadata, NovelStatistics, WorldBook,
};
use crate::infrastructure::persistence::NovelStorage;

/// 旧版小说记录（迁移的唯一来源）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyNovel {
    pub id: String,
    /// 旧格式用 name 字段存书名
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub chapters: Vec<LegacyChapter>,
}

/// 旧版章节记录（正文内联）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyChapter {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

/// 单部小说的迁移进度事件
#[derive(Debug, Clone)]
pub struct MigrationProgress {
    pub current: usize,
    pub total: usize,
    pub novel_title: String,
    pub status: MigrationStatus,
    pub error: Option<String>,
}

/// 迁移状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStatus {
    Success,
    Error,
}

/// 整批迁移的结果
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub migrated: usize,
    pub total: usize,
}

/// 整批校验的结果
#[derive(Debug, Clone)]
pub struct MigrationValidation {
    pub passed: bool,
    pub novels: Vec<NovelValidation>,
}

/// 单部小说的校验结果，error 记录首个不匹配原因
#[derive(Debug, Clone)]
pub struct NovelValidation {
    pub novel_id: String,
    pub passed: bool,
    pub error: Option<String>,
}

/// 迁移驱动器
pub struct MigrationService {
    storage: Arc<NovelStorage>,
}

impl MigrationService {
    pub fn new(storage: Arc<NovelStorage>) -> Self {
        Self { storage }
    }

    /// 迁移整批旧版小说
    ///
    /// 逐部迁移并通过 `on_progress` 上报进度；单部失败不会中断整批
    pub async fn migrate(
        &self,
        legacy_novels: &[LegacyNovel],
        mut on_progress: impl FnMut(MigrationProgress),
    ) -> StorageResult<MigrationReport> {
        let total = legacy_novels.len();
        let mut migrated = 0;

        tracing::info!(total, "Starting legacy migration");

        for legacy in legacy_novels {
            match self.migrate_novel(legacy).await {
                Ok(()) => {
                    migrated += 1;
                    on_progress(MigrationProgress {
                        current: migrated,
                        total,
                        novel_title: legacy.name.clone(),
                        status: MigrationStatus::Success,
                        error: None,
                    });
                    tracing::info!(
                        novel_id = %legacy.id,
                        title = %legacy.name,
                        "Novel migrated ({}/{})",
                        migrated,
                        total
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        novel_id = %legacy.id,
                        title = %legacy.name,
                        error = %e,
                        "Novel migration failed"
                    );
                    on_progress(MigrationProgress {
                        current: migrated,
                        total,
                        novel_title: legacy.name.clone(),
                        status: MigrationStatus::Error,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        tracing::info!(migrated, total, "Legacy migration finished");
        Ok(MigrationReport { migrated, total })
    }

    /// 迁移单部小说：元数据、逐章写入（保留原始 ID）、默认世界书与 AI 配置
    async fn migrate_novel(&self, legacy: &LegacyNovel) -> StorageResult<()> {
        let now = Utc::now();

        // 聚合统计从旧版章节正文重新计算，不信任旧记录
        let total_words: usize = legacy
            .chapters
            .iter()
            .map(|c| word_count(c.content.as_deref().unwrap_or("")))
            .sum();

        let metadata = NovelMetadata {
            id: legacy.id.clone(),
            title: legacy.name.clone(),
            author: legacy.author.clone().unwrap_or_default(),
            description: legacy.description.clone().unwrap_or_default(),
            cover: legacy.cover.clone(),
            tags: legacy.tags.clone(),
            created_at: legacy.created_at.unwrap_or(now),
            updated_at: now,
            statistics: NovelStatistics {
                total_chapters: legacy.chapters.len(),
                total_words,
                last_edit_chapter_id: legacy.chapters.last().map(|c| c.id.clone()),
            },
            version: String::new(), // save 时统一盖章
        };
        self.storage.save_novel_metadata(&legacy.id, metadata).await?;

        // 逐章写入；索引由 save_chapter 按写入顺序重建，位置致密
        for (i, legacy_chapter) in legacy.chapters.iter().enumerate() {
            let chapter = Chapter {
                id: legacy_chapter.id.clone(),
                title: legacy_chapter
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("第{}章", i + 1)),
                content: legacy_chapter.content.clone().unwrap_or_default(),
                word_count: 0,
                tags: legacy_chapter.tags.clone(),
                references: legacy_chapter.references.clone(),
                created_at: legacy_chapter.created_at.unwrap_or(now),
                updated_at: legacy_chapter.updated_at.unwrap_or(now),
            };
            self.storage.save_chapter(&legacy.id, chapter).await?;
        }

        // 世界书和 AI 配置仅在尚不存在时写入默认值；失败不阻断迁移
        if !self.storage.world_book_exists(&legacy.id).await {
            if let Err(e) = self
                .storage
                .save_world_book(&legacy.id, WorldBook::default())
                .await
            {
                tracing::warn!(novel_id = %legacy.id, error = %e, "Failed to write default world book");
            }
        }
        if !self.storage.ai_config_exists(&legacy.id).await {
            if let Err(e) = self
                .storage
                .save_ai_config(&legacy.id, AiConfig::default())
                .await
            {
                tracing::warn!(novel_id = %legacy.id, error = %e, "Failed to write default AI config");
            }
        }

        Ok(())
    }

    /// 校验迁移结果
    ///
    /// 重新读取每个已迁移实体并逐字节比对章节正文；不修改任何状态
    pub async fn validate(&self, legacy_novels: &[LegacyNovel]) -> MigrationValidation {
        let mut novels = Vec::with_capacity(legacy_novels.len());

        for legacy in legacy_novels {
            let result = self.validate_novel(legacy).await;
            novels.push(result);
        }

        MigrationValidation {
            passed: novels.iter().all(|v| v.passed),
            novels,
        }
    }

    async fn validate_novel(&self, legacy: &LegacyNovel) -> NovelValidation {
        let fail = |error: String| NovelValidation {
            novel_id: legacy.id.clone(),
            passed: false,
            error: Some(error),
        };

        if self.storage.load_novel_metadata(&legacy.id).await.is_err() {
            return fail("metadata missing".to_string());
        }

        let index = match self.storage.load_chapter_index(&legacy.id).await {
            Ok(index) => index,
            Err(e) => return fail(format!("chapter index unreadable: {}", e)),
        };

        if index.len() != legacy.chapters.len() {
            return fail(format!(
                "chapter count mismatch: expected {}, found {}",
                legacy.chapters.len(),
                index.len()
            ));
        }

        for legacy_chapter in &legacy.chapters {
            let chapter = match self.storage.load_chapter(&legacy.id, &legacy_chapter.id).await {
                Ok(chapter) => chapter,
                Err(_) => return fail(format!("chapter {} missing", legacy_chapter.id)),
            };

            let expected = legacy_chapter.content.as_deref().unwrap_or("");
            if chapter.content.as_bytes() != expected.as_bytes() {
                return fail(format!("chapter {} content mismatch", legacy_chapter.id));
            }
        }

        NovelValidation {
            novel_id: legacy.id.clone(),
            passed: true,
            error: None,
        }
    }
}
