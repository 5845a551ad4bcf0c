//! Domain Layer - 领域模型
//!
//! - novel/: 小说、章节与章节索引
//! - context: 章节 AI 上下文（派生摘要状态）
//! - worldbook: 世界书设定
//! - ai_config: 每部小说的 AI 配置
//! - fingerprint: 内容指纹

pub mod ai_config;
pub mod context;
pub mod fingerprint;
pub mod novel;
pub mod worldbook;

pub use ai_config::{AiConfig, UseCaseConfig};
pub use context::{AiContext, AiProcessingStatus};
pub use fingerprint::Fingerprint;
pub use novel::{
    new_chapter_id, word_count, Chapter, ChapterDraft, ChapterIndex, ChapterIndexEntry,
    NovelMetadata, NovelStatistics,
};
pub use worldbook::{CharacterEntry, NamedEntry, WorldBook, WorldSetting, WorldSettings};
