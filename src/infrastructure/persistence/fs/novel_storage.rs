//! Novel Storage - 分层文件存储引擎
//!
//! 小说的所有实体读写都经过本引擎。磁盘布局（一种实体一个文件）:
//!
//! ```text
//! {base}/novels/{novelId}/novel.json
//! {base}/novels/{novelId}/worldbook.json
//! {base}/novels/{novelId}/ai_config.json
//! {base}/novels/{novelId}/chapters/index.json
//! {base}/novels/{novelId}/chapters/{chapterId}.json
//! {base}/novels/{novelId}/contexts/{chapterId}.json
//! ```
//!
//! 章节索引是章节元数据的反规范化投影，由引擎在每次章节写入/删除时
//! 同步维护，绝不交给调用方。写序约束：章节文件写入完成之后才更新
//! 索引，崩溃时索引不会引用从未写入的章节文件。

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::error::{StorageError, StorageResult};
use crate::domain::{
    new_chapter_id, AiConfig, AiContext, Chapter, ChapterDraft, ChapterIndex, Fingerprint,
    NovelMetadata, WorldBook,
};
use crate::infrastructure::memory::ChapterCache;

/// 分层存储引擎
///
/// 显式实例：以根目录和缓存容量构造，不使用全局单例
pub struct NovelStorage {
    base_dir: PathBuf,
    cache: ChapterCache,
}

impl NovelStorage {
    /// 创建存储引擎并确保根目录存在
    pub async fn new(
        base_dir: impl AsRef<Path>,
        cache_capacity: usize,
    ) -> StorageResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;

        tracing::info!(
            base_dir = %base_dir.display(),
            cache_capacity,
            "NovelStorage initialized"
        );

        Ok(Self {
            base_dir,
            cache: ChapterCache::new(cache_capacity),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    // ==================== 路径布局 ====================

    fn novel_dir(&self, novel_id: &str) -> PathBuf {
        self.base_dir.join("novels").join(novel_id)
    }

    fn chapters_dir(&self, novel_id: &str) -> PathBuf {
        self.novel_dir(novel_id).join("chapters")
    }

    fn contexts_dir(&self, novel_id: &str) -> PathBuf {
        self.novel_dir(novel_id).join("contexts")
    }

    fn novel_file(&self, novel_id: &str) -> PathBuf {
        self.novel_dir(novel_id).join("novel.json")
    }

    fn world_book_file(&self, novel_id: &str) -> PathBuf {
        self.novel_dir(novel_id).join("worldbook.json")
    }

    fn ai_config_file(&self, novel_id: &str) -> PathBuf {
        self.novel_dir(novel_id).join("ai_config.json")
    }

    fn index_file(&self, novel_id: &str) -> PathBuf {
        self.chapters_dir(novel_id).join("index.json")
    }

    fn chapter_file(&self, novel_id: &str, chapter_id: &str) -> PathBuf {
        self.chapters_dir(novel_id).join(format!("{}.json", chapter_id))
    }

    fn context_file(&self, novel_id: &str, chapter_id: &str) -> PathBuf {
        self.contexts_dir(novel_id).join(format!("{}.json", chapter_id))
    }

    // ==================== 通用读写 ====================

    /// 读取 JSON 记录；文件缺失返回 Ok(None)
    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> StorageResult<Option<T>> {
        match fs::read(path).await {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    /// 以 UTF-8 pretty JSON 写入记录，按需创建父目录
    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(path, bytes).await?;
        Ok(())
    }

    // ==================== 小说元数据 ====================

    /// 加载小说元数据；文件缺失时返回 NotFound
    pub async fn load_novel_metadata(&self, novel_id: &str) -> StorageResult<NovelMetadata> {
        self.read_json(&self.novel_file(novel_id))
            .await?
            .ok_or_else(|| StorageError::not_found("Novel", novel_id))
    }

    /// 保存小说元数据，盖章 id、updatedAt 与 schema 版本
    pub async fn save_novel_metadata(
        &self,
        novel_id: &str,
        mut metadata: NovelMetadata,
    ) -> StorageResult<NovelMetadata> {
        metadata.id = novel_id.to_string();
        metadata.updated_at = Utc::now();
        metadata.version = crate::domain::novel::entities::default_schema_version();

        self.write_json(&self.novel_file(novel_id), &metadata).await?;

        tracing::debug!(novel_id = %novel_id, "Saved novel metadata");
        Ok(metadata)
    }

    /// 删除小说的整个存储子树并清空其全部缓存条目
    ///
    /// 对部分写入的小说也必须安全：子目录缺失视为已删除，不是错误
    pub async fn delete_novel(&self, novel_id: &str) -> StorageResult<()> {
        match fs::remove_dir_all(self.novel_dir(novel_id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::Io(e.to_string())),
        }

        self.cache.invalidate(novel_id, None);

        tracing::info!(novel_id = %novel_id, "Deleted novel");
        Ok(())
    }

    // ==================== 章节索引 ====================

    /// 加载章节索引；首次使用（文件缺失）返回空索引
    pub async fn load_chapter_index(&self, novel_id: &str) -> StorageResult<ChapterIndex> {
        Ok(self
            .read_json(&self.index_file(novel_id))
            .await?
            .unwrap_or_default())
    }

    /// 保存章节索引
    pub async fn save_chapter_index(
        &self,
        novel_id: &str,
        index: &ChapterIndex,
    ) -> StorageResult<()> {
        self.write_json(&self.index_file(novel_id), index).await
    }

    // ==================== 章节数据 ====================

    /// 加载章节：先查缓存，未命中读文件并回填缓存
    pub async fn load_chapter(&self, novel_id: &str, chapter_id: &str) -> StorageResult<Chapter> {
        if let Some(chapter) = self.cache.get(novel_id, chapter_id) {
            tracing::trace!(novel_id = %novel_id, chapter_id = %chapter_id, "Chapter cache hit");
            return Ok(chapter);
        }

        let chapter: Chapter = self
            .read_json(&self.chapter_file(novel_id, chapter_id))
            .await?
            .ok_or_else(|| StorageError::not_found("Chapter", chapter_id))?;

        self.cache.put(novel_id, chapter_id, chapter.clone());
        Ok(chapter)
    }

    /// 保存章节
    ///
    /// 由正文重新计算字数、盖章 updatedAt，写入章节文件后刷新缓存，
    /// 并同步更新章节索引（已有条目保留 position，新章节追加到末尾）。
    /// 索引更新是本操作不可省略的后置条件。
    pub async fn save_chapter(
        &self,
        novel_id: &str,
        mut chapter: Chapter,
    ) -> StorageResult<Chapter> {
        chapter.recount_words();
        chapter.updated_at = Utc::now();

        // 章节文件必须先于索引落盘
        self.write_json(&self.chapter_file(novel_id, &chapter.id), &chapter)
            .await?;

        self.cache.put(novel_id, &chapter.id, chapter.clone());

        if let Err(e) = self.update_chapter_in_index(novel_id, &chapter).await {
            // 章节文件已写入；索引过期是唯一可接受的暂态，但仍作为错误上报
            tracing::warn!(
                novel_id = %novel_id,
                chapter_id = %chapter.id,
                error = %e,
                "Chapter written but index update failed"
            );
            return Err(StorageError::Consistency(format!(
                "chapter {} written but index update failed: {}",
                chapter.id, e
            )));
        }

        tracing::debug!(
            novel_id = %novel_id,
            chapter_id = %chapter.id,
            word_count = chapter.word_count,
            "Saved chapter"
        );
        Ok(chapter)
    }

    /// 创建新章节：生成时间有序 ID、补齐默认值后走 save_chapter
    pub async fn create_chapter(
        &self,
        novel_id: &str,
        draft: ChapterDraft,
    ) -> StorageResult<Chapter> {
        let now = Utc::now();
        let chapter = Chapter {
            id: new_chapter_id(),
            title: draft.title.unwrap_or_else(|| "新章节".to_string()),
            content: draft.content.unwrap_or_default(),
            word_count: 0,
            tags: draft.tags,
            references: draft.references,
            created_at: now,
            updated_at: now,
        };
        self.save_chapter(novel_id, chapter).await
    }

    /// 删除章节：移除文件、失效缓存、从索引摘除
    ///
    /// 文件已缺失时为幂等成功
    pub async fn delete_chapter(&self, novel_id: &str, chapter_id: &str) -> StorageResult<()> {
        match fs::remove_file(self.chapter_file(novel_id, chapter_id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::Io(e.to_string())),
        }

        self.cache.invalidate(novel_id, Some(chapter_id));
        self.remove_chapter_from_index(novel_id, chapter_id).await?;

        tracing::debug!(novel_id = %novel_id, chapter_id = %chapter_id, "Deleted chapter");
        Ok(())
    }

    async fn update_chapter_in_index(
        &self,
        novel_id: &str,
        chapter: &Chapter,
    ) -> StorageResult<()> {
        let mut index = self.load_chapter_index(novel_id).await?;
        index.upsert(chapter);
        self.save_chapter_index(novel_id, &index).await
    }

    async fn remove_chapter_from_index(
        &self,
        novel_id: &str,
        chapter_id: &str,
    ) -> StorageResult<()> {
        let mut index = self.load_chapter_index(novel_id).await?;
        if index.remove(chapter_id) {
            self.save_chapter_index(novel_id, &index).await?;
        }
        Ok(())
    }

    // ==================== AI 上下文 ====================

    /// 加载章节 AI 上下文；未生成过摘要（文件缺失）返回 None
    pub async fn load_ai_context(
        &self,
        novel_id: &str,
        chapter_id: &str,
    ) -> StorageResult<Option<AiContext>> {
        self.read_json(&self.context_file(novel_id, chapter_id)).await
    }

    /// 保存章节 AI 上下文，盖章 lastProcessedAt
    pub async fn save_ai_context(
        &self,
        novel_id: &str,
        chapter_id: &str,
        mut context: AiContext,
    ) -> StorageResult<AiContext> {
        context.chapter_id = chapter_id.to_string();
        context.last_processed_at = Utc::now();

        self.write_json(&self.context_file(novel_id, chapter_id), &context)
            .await?;

        tracing::debug!(
            novel_id = %novel_id,
            chapter_id = %chapter_id,
            status = ?context.ai_processing_status,
            "Saved AI context"
        );
        Ok(context)
    }

    /// 判断章节是否需要重新生成摘要
    ///
    /// 上下文缺失、指纹不匹配或状态不是 completed 时都需要重新生成
    pub async fn needs_new_summary(
        &self,
        novel_id: &str,
        chapter_id: &str,
        current_content: &str,
    ) -> StorageResult<bool> {
        let Some(context) = self.load_ai_context(novel_id, chapter_id).await? else {
            return Ok(true);
        };
        let current_hash = Fingerprint::from_text(current_content);
        Ok(!context.is_fresh_for(&current_hash))
    }

    // ==================== 世界书 ====================

    /// 加载世界书；文件缺失返回空的默认结构
    pub async fn load_world_book(&self, novel_id: &str) -> StorageResult<WorldBook> {
        Ok(self
            .read_json(&self.world_book_file(novel_id))
            .await?
            .unwrap_or_default())
    }

    /// 保存世界书，盖章 updatedAt
    pub async fn save_world_book(
        &self,
        novel_id: &str,
        mut world_book: WorldBook,
    ) -> StorageResult<WorldBook> {
        world_book.updated_at = Utc::now();
        self.write_json(&self.world_book_file(novel_id), &world_book)
            .await?;
        Ok(world_book)
    }

    /// 世界书文件是否已存在（供迁移器判断是否写入默认值）
    pub async fn world_book_exists(&self, novel_id: &str) -> bool {
        fs::try_exists(self.world_book_file(novel_id))
            .await
            .unwrap_or(false)
    }

    // ==================== AI 配置 ====================

    /// 加载 AI 配置；文件缺失返回进程级默认值
    pub async fn load_ai_config(&self, novel_id: &str) -> StorageResult<AiConfig> {
        Ok(self
            .read_json(&self.ai_config_file(novel_id))
            .await?
            .unwrap_or_default())
    }

    /// 保存 AI 配置，盖章 updatedAt
    pub async fn save_ai_config(
        &self,
        novel_id: &str,
        mut config: AiConfig,
    ) -> StorageResult<AiConfig> {
        config.updated_at = Utc::now();
        self.write_json(&self.ai_config_file(novel_id), &config)
            .await?;
        Ok(config)
    }

    /// AI 配置文件是否已存在
    pub async fn ai_config_exists(&self, novel_id: &str) -> bool {
        fs::try_exists(self.ai_config_file(novel_id))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AiProcessingStatus, NovelMetadata};
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> NovelStorage {
        NovelStorage::new(dir, 50).await.unwrap()
    }

    fn draft(title: &str, content: &str) -> ChapterDraft {
        ChapterDraft {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_novel_metadata_round_trip() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let meta = NovelMetadata::new("n1", "测试小说");
        let saved = storage.save_novel_metadata("n1", meta).await.unwrap();
        assert_eq!(saved.version, "1.0");

        let loaded = storage.load_novel_metadata("n1").await.unwrap();
        assert_eq!(loaded.title, "测试小说");
        assert_eq!(loaded.id, "n1");
    }

    #[tokio::test]
    async fn test_load_missing_novel_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let err = storage.load_novel_metadata("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_chapter_index_defaults_to_empty() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let index = storage.load_chapter_index("n1").await.unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_save_chapter_recomputes_word_count() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let mut chapter = storage
            .create_chapter("n1", draft("第一章", "Hello world"))
            .await
            .unwrap();
        assert_eq!(chapter.word_count, 10);

        // 调用方传入的字数不可信，写入时必须重算
        chapter.word_count = 9999;
        chapter.content = "abc".to_string();
        let saved = storage.save_chapter("n1", chapter).await.unwrap();
        assert_eq!(saved.word_count, 3);
    }

    #[tokio::test]
    async fn test_save_chapter_keeps_index_in_sync() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let c1 = storage.create_chapter("n1", draft("一", "aaa")).await.unwrap();
        let c2 = storage.create_chapter("n1", draft("二", "bbbb")).await.unwrap();

        let index = storage.load_chapter_index("n1").await.unwrap();
        assert_eq!(index.len(), 2);

        let e1 = index.get(&c1.id).unwrap();
        assert_eq!(e1.title, "一");
        assert_eq!(e1.word_count, 3);
        assert_eq!(e1.position, 0);
        assert_eq!(index.get(&c2.id).unwrap().position, 1);

        // 更新第一章，position 不变，元信息刷新
        let mut updated = c1.clone();
        updated.title = "一（修订）".to_string();
        updated.content = "aaaaa".to_string();
        storage.save_chapter("n1", updated).await.unwrap();

        let index = storage.load_chapter_index("n1").await.unwrap();
        let e1 = index.get(&c1.id).unwrap();
        assert_eq!(e1.title, "一（修订）");
        assert_eq!(e1.word_count, 5);
        assert_eq!(e1.position, 0);
        assert_eq!(index.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_chapter_removes_file_cache_and_index_entry() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let chapter = storage.create_chapter("n1", draft("一", "aaa")).await.unwrap();
        storage.delete_chapter("n1", &chapter.id).await.unwrap();

        let err = storage.load_chapter("n1", &chapter.id).await.unwrap_err();
        assert!(err.is_not_found());

        let index = storage.load_chapter_index("n1").await.unwrap();
        assert!(index.get(&chapter.id).is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_chapter_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage.delete_chapter("n1", "ghost").await.unwrap();
        storage.delete_chapter("n1", "ghost").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_novel_is_safe_on_partial_state() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        // 从未写入过的小说
        storage.delete_novel("never-written").await.unwrap();

        // 正常写入后删除，随后加载失败
        storage.create_chapter("n1", draft("一", "aaa")).await.unwrap();
        storage.delete_novel("n1").await.unwrap();
        let index = storage.load_chapter_index("n1").await.unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_cold_reload_returns_identical_chapter() {
        let dir = tempdir().unwrap();

        let chapter_id = {
            let storage = storage(dir.path()).await;
            let chapter = storage
                .create_chapter("n1", draft("第一章", "Hello world"))
                .await
                .unwrap();
            chapter.id
        };

        // 新实例，缓存为冷
        let fresh = storage(dir.path()).await;
        let loaded = fresh.load_chapter("n1", &chapter_id).await.unwrap();
        assert_eq!(loaded.title, "第一章");
        assert_eq!(loaded.content, "Hello world");
        assert_eq!(loaded.word_count, 10);
    }

    #[tokio::test]
    async fn test_load_chapter_works_with_cache_disabled() {
        let dir = tempdir().unwrap();
        let storage = NovelStorage::new(dir.path(), 0).await.unwrap();

        let chapter = storage.create_chapter("n1", draft("一", "aaa")).await.unwrap();
        let loaded = storage.load_chapter("n1", &chapter.id).await.unwrap();
        assert_eq!(loaded.content, "aaa");
    }

    #[tokio::test]
    async fn test_ai_context_lifecycle() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        assert!(storage.load_ai_context("n1", "c1").await.unwrap().is_none());
        assert!(storage.needs_new_summary("n1", "c1", "body").await.unwrap());

        let hash = Fingerprint::from_text("body");
        storage
            .save_ai_context("n1", "c1", AiContext::completed("c1", hash, "摘要"))
            .await
            .unwrap();

        // 内容未变：无需重新生成
        assert!(!storage.needs_new_summary("n1", "c1", "body").await.unwrap());
        // 内容已变：指纹不匹配
        assert!(storage.needs_new_summary("n1", "c1", "edited").await.unwrap());

        let ctx = storage.load_ai_context("n1", "c1").await.unwrap().unwrap();
        assert_eq!(ctx.ai_processing_status, AiProcessingStatus::Completed);
        assert_eq!(ctx.summary, "摘要");
    }

    #[tokio::test]
    async fn test_processing_status_is_not_fresh() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let hash = Fingerprint::from_text("body");
        storage
            .save_ai_context("n1", "c1", AiContext::processing("c1", hash))
            .await
            .unwrap();

        // 指纹相同但状态是 processing，仍然需要重新生成
        assert!(storage.needs_new_summary("n1", "c1", "body").await.unwrap());
    }

    #[tokio::test]
    async fn test_world_book_defaults_and_round_trip() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        assert!(!storage.world_book_exists("n1").await);
        let book = storage.load_world_book("n1").await.unwrap();
        assert!(book.settings.world.name.is_empty());

        let mut book = WorldBook::default();
        book.settings.world.name = "九州".to_string();
        storage.save_world_book("n1", book).await.unwrap();

        assert!(storage.world_book_exists("n1").await);
        let loaded = storage.load_world_book("n1").await.unwrap();
        assert_eq!(loaded.settings.world.name, "九州");
    }

    #[tokio::test]
    async fn test_ai_config_defaults_and_round_trip() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        assert!(!storage.ai_config_exists("n1").await);
        let config = storage.load_ai_config("n1").await.unwrap();
        assert_eq!(config.default_provider, "openai");

        let mut config = AiConfig::default();
        config.summary_config.model = "gpt-4o-mini".to_string();
        storage.save_ai_config("n1", config).await.unwrap();

        let loaded = storage.load_ai_config("n1").await.unwrap();
        assert_eq!(loaded.summary_config.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_chapter_files_are_pretty_json() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let chapter = storage.create_chapter("n1", draft("一", "aaa")).await.unwrap();
        let path = storage.chapter_file("n1", &chapter.id);
        let raw = tokio::fs::read_to_string(path).await.unwrap();
        assert!(raw.contains('\n'));
        assert!(raw.contains("\"wordCount\": 3"));
    }
}
