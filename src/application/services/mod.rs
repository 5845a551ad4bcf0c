//! Application Services - 应用服务

pub mod migration_service;
pub mod summary_service;

pub use migration_service::{
    LegacyChapter, LegacyNovel, MigrationProgress, MigrationReport, MigrationService,
    MigrationStatus, MigrationValidation, NovelValidation,
};
pub use summary_service::{
    FullBookSummary, SummaryOptions, SummaryOutcome, SummaryProgress, SummaryService,
};
