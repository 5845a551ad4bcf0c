//! NovelBox Core - 长篇小说分层存储与派生数据一致性引擎
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Novel Context: 小说、章节与章节索引
//! - AI Context: 章节派生摘要状态与内容指纹
//! - World Book / AI Config: 世界书与每部小说的 AI 配置
//!
//! 应用层 (application/):
//! - Ports: 端口定义（LlmEngine 生成契约）
//! - Services: SummaryService 摘要协调、MigrationService 旧版迁移
//! - Error: 统一的结果与错误类型
//!
//! 基础设施层 (infrastructure/):
//! - Persistence: 分层文件存储引擎（每个实体一个 JSON 文件）
//! - Memory: 有界 LRU 章节缓存
//! - Adapters: 生成服务测试替身
//!
//! 图形编辑器、窗口生命周期与各 AI 服务商的 HTTP 客户端都是
//! 本 crate 之外的协作方。

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use application::error::{StorageError, StorageResult};
pub use application::ports::{GenerateRequest, GenerateResponse, LlmEnginePort, LlmError};
pub use application::services::{
    LegacyChapter, LegacyNovel, MigrationProgress, MigrationReport, MigrationService,
    MigrationStatus, SummaryOptions, SummaryOutcome, SummaryService,
};
pub use config::{load_config, AppConfig};
pub use domain::{
    AiConfig, AiContext, AiProcessingStatus, Chapter, ChapterDraft, ChapterIndex, Fingerprint,
    NovelMetadata, WorldBook,
};
pub use infrastructure::memory::ChapterCache;
pub use infrastructure::persistence::NovelStorage;
pub use logging::init_logging;
