//! In-Memory Infrastructure - 内存组件

pub mod chapter_cache;

pub use chapter_cache::ChapterCache;
