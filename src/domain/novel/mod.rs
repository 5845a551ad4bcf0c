//! Novel Context - 小说管理上下文

pub mod entities;
pub mod value_objects;

pub use entities::{
    Chapter, ChapterDraft, ChapterIndex, ChapterIndexEntry, NovelMetadata, NovelStatistics,
};
pub use value_objects::{new_chapter_id, word_count};
