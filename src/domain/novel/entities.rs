//! Novel Context - Entities
//!
//! 小说元数据、章节与章节索引。磁盘格式使用 camelCase 字段名，
//! 与既有的 JSON 数据文件保持兼容。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::word_count;

/// 小说元数据 - 每部小说一个 novel.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelMetadata {
    /// 小说 ID（不透明的稳定字符串）
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// 封面引用（可选）
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub statistics: NovelStatistics,
    /// 磁盘格式的 schema 版本，保存时统一盖章
    #[serde(default = "default_schema_version")]
    pub version: String,
}

pub(crate) fn default_schema_version() -> String {
    "1.0".to_string()
}

impl NovelMetadata {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            author: String::new(),
            description: String::new(),
            cover: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            statistics: NovelStatistics::default(),
            version: default_schema_version(),
        }
    }
}

/// 小说聚合统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelStatistics {
    /// 章节总数
    pub total_chapters: usize,
    /// 全书总字数
    pub total_words: usize,
    /// 最近编辑的章节 ID
    #[serde(default)]
    pub last_edit_chapter_id: Option<String>,
}

/// 章节 - 每章一个 {chapterId}.json
///
/// 不变量: word_count 等于对 content 调用字数统计函数的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// 章节 ID（不透明、时间有序的字符串）
    pub id: String,
    pub title: String,
    /// 正文
    pub content: String,
    /// 字数（写入时由正文重新计算，不信任调用方传入的值）
    #[serde(default)]
    pub word_count: usize,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 自由格式的交叉引用
    #[serde(default)]
    pub references: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建章节的输入数据，缺省字段由存储引擎补齐
#[derive(Debug, Clone, Default)]
pub struct ChapterDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub references: Vec<String>,
}

/// 章节索引 - 每部小说一个 index.json
///
/// 所有章节元信息的反规范化投影，用于列表展示时避免扫描章节目录。
/// 不变量: 每次章节写入成功后，索引条目与磁盘上的章节文件一一对应。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterIndex {
    #[serde(default)]
    pub chapters: Vec<ChapterIndexEntry>,
}

/// 章节索引条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterIndexEntry {
    pub id: String,
    pub title: String,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 展示顺序；新章节追加到末尾，更新时保留原位置
    pub position: usize,
}

impl ChapterIndex {
    /// 插入或替换章节条目
    ///
    /// 已存在的条目保留其 position；新条目追加到索引末尾
    pub fn upsert(&mut self, chapter: &Chapter) {
        let existing = self.chapters.iter().position(|e| e.id == chapter.id);
        let position = match existing {
            Some(i) => self.chapters[i].position,
            None => self.chapters.len(),
        };

        let entry = ChapterIndexEntry {
            id: chapter.id.clone(),
            title: chapter.title.clone(),
            word_count: chapter.word_count,
            created_at: chapter.created_at,
            updated_at: chapter.updated_at,
            position,
        };

        match existing {
            Some(i) => self.chapters[i] = entry,
            None => self.chapters.push(entry),
        }
    }

    /// 移除章节条目，返回是否存在
    pub fn remove(&mut self, chapter_id: &str) -> bool {
        let before = self.chapters.len();
        self.chapters.retain(|e| e.id != chapter_id);
        self.chapters.len() != before
    }

    pub fn get(&self, chapter_id: &str) -> Option<&ChapterIndexEntry> {
        self.chapters.iter().find(|e| e.id == chapter_id)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

impl Chapter {
    /// 重新计算字数，恢复不变量
    pub fn recount_words(&mut self) {
        self.word_count = word_count(&self.content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(id: &str, title: &str, content: &str) -> Chapter {
        let now = Utc::now();
        let mut c = Chapter {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            word_count: 0,
            tags: Vec::new(),
            references: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        c.recount_words();
        c
    }

    #[test]
    fn test_upsert_appends_new_entries_with_dense_positions() {
        let mut index = ChapterIndex::default();
        index.upsert(&chapter("c1", "一", "aaa"));
        index.upsert(&chapter("c2", "二", "bbb"));
        index.upsert(&chapter("c3", "三", "ccc"));

        let positions: Vec<usize> = index.chapters.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_upsert_preserves_position_on_update() {
        let mut index = ChapterIndex::default();
        index.upsert(&chapter("c1", "一", "aaa"));
        index.upsert(&chapter("c2", "二", "bbb"));

        index.upsert(&chapter("c1", "一（改）", "aaaa"));

        let entry = index.get("c1").unwrap();
        assert_eq!(entry.position, 0);
        assert_eq!(entry.title, "一（改）");
        assert_eq!(entry.word_count, 4);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut index = ChapterIndex::default();
        index.upsert(&chapter("c1", "一", "aaa"));

        assert!(index.remove("c1"));
        assert!(!index.remove("c1"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_metadata_disk_format_is_camel_case() {
        let meta = NovelMetadata::new("novel-1", "测试");
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"totalChapters\""));
    }
}
