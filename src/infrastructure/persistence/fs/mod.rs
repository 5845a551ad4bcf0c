//! Filesystem Persistence - 文件系统持久化

pub mod novel_storage;

pub use novel_storage::NovelStorage;
