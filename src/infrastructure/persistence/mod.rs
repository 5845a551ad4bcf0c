//! Persistence Infrastructure - 持久化

pub mod fs;

pub use fs::NovelStorage;
