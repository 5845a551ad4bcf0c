//! Summary Service - 派生摘要协调器
//!
//! 决定章节摘要是否过期、对同一章节的并发重新生成请求做串行化，
//! 并编排对外部生成契约的调用，所有状态转移都通过存储引擎落盘。
//!
//! 并发模型: in_flight 映射以复合键 (novel_id, chapter_id) 保存每章
//! 一把异步互斥锁，同一章节同时至多一个外部生成调用在途；后到的
//! 请求等待先行者完成后重新做过期检查，直接复用刚落盘的摘要。

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::error::{StorageError, StorageResult};
use crate::application::ports::{GenerateRequest, LlmEnginePort};
use crate::domain::{AiContext, AiProcessingStatus, Fingerprint};
use crate::infrastructure::persistence::NovelStorage;

/// 自动摘要跳过阈值的默认值（字符数）
pub const DEFAULT_MIN_AUTO_LENGTH: usize = 100;

type SummaryKey = (String, String);

/// 摘要生成选项
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    /// 为 true 时无视指纹匹配，总是调用外部生成
    pub force: bool,
    /// 调用方附加的额外指示
    pub custom_prompt: Option<String>,
}

/// 一次摘要请求的结果
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub context: AiContext,
    /// true 表示直接复用已落盘的摘要，未发生外部调用
    pub from_cache: bool,
}

/// 全书摘要
#[derive(Debug, Clone)]
pub struct FullBookSummary {
    pub text: String,
    /// 参与拼接的章节数
    pub chapter_count: usize,
}

/// 各章节摘要状态统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryProgress {
    pub total: usize,
    pub completed: usize,
    pub processing: usize,
    pub failed: usize,
    pub pending: usize,
}

/// 派生摘要协调器
pub struct SummaryService {
    storage: Arc<NovelStorage>,
    llm: Arc<dyn LlmEnginePort>,
    /// 每章一把锁的在途请求映射，完成后自动移除
    in_flight: DashMap<SummaryKey, Arc<Mutex<()>>>,
    auto_summary_enabled: AtomicBool,
    min_auto_length: usize,
}

impl SummaryService {
    pub fn new(storage: Arc<NovelStorage>, llm: Arc<dyn LlmEnginePort>) -> Self {
        Self {
            storage,
            llm,
            in_flight: DashMap::new(),
            auto_summary_enabled: AtomicBool::new(true),
            min_auto_length: DEFAULT_MIN_AUTO_LENGTH,
        }
    }

    /// 覆盖自动摘要的最小正文长度阈值
    pub fn with_min_auto_length(mut self, min_auto_length: usize) -> Self {
        self.min_auto_length = min_auto_length;
        self
    }

    pub fn set_auto_summary_enabled(&self, enabled: bool) {
        self.auto_summary_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_auto_summary_enabled(&self) -> bool {
        self.auto_summary_enabled.load(Ordering::SeqCst)
    }

    /// 确保章节摘要与当前正文一致
    ///
    /// 指纹匹配且状态为 completed 时直接返回已有摘要（from_cache），
    /// 否则先落盘 processing 状态，再调用外部生成并落盘终态。
    pub async fn ensure_summary(
        &self,
        novel_id: &str,
        chapter_id: &str,
        current_content: &str,
        options: &SummaryOptions,
    ) -> StorageResult<SummaryOutcome> {
        let key = (novel_id.to_string(), chapter_id.to_string());
        let gate = self.gate_for(&key);

        let result = {
            let _guard = gate.lock().await;
            self.generate_summary(novel_id, chapter_id, current_content, options)
                .await
        };

        // 完成即移除在途条目；ptr_eq 防止误删后继请求的新锁
        self.in_flight.remove_if(&key, |_, v| Arc::ptr_eq(v, &gate));

        result
    }

    /// 自动触发的摘要生成
    ///
    /// 自动模式关闭或正文短于阈值时跳过（Ok(None)），不是错误
    pub async fn auto_generate_summary(
        &self,
        novel_id: &str,
        chapter_id: &str,
        current_content: &str,
    ) -> StorageResult<Option<SummaryOutcome>> {
        if !self.is_auto_summary_enabled() {
            return Ok(None);
        }
        if current_content.trim().chars().count() < self.min_auto_length {
            tracing::debug!(
                novel_id = %novel_id,
                chapter_id = %chapter_id,
                "Content too short, skipping auto summary"
            );
            return Ok(None);
        }

        let outcome = self
            .ensure_summary(novel_id, chapter_id, current_content, &SummaryOptions::default())
            .await?;
        Ok(Some(outcome))
    }

    /// 生成全书摘要
    ///
    /// 按章节索引顺序拼接各章已完成的摘要；一章摘要都没有时失败
    pub async fn full_book_summary(&self, novel_id: &str) -> StorageResult<FullBookSummary> {
        let mut index = self.storage.load_chapter_index(novel_id).await?;
        index.chapters.sort_by_key(|e| e.position);

        let mut blocks = Vec::new();
        for entry in &index.chapters {
            let Some(context) = self.storage.load_ai_context(novel_id, &entry.id).await? else {
                continue;
            };
            if context.ai_processing_status == AiProcessingStatus::Completed
                && !context.summary.is_empty()
            {
                blocks.push(format!(
                    "第{}章 {}:\n{}",
                    blocks.len() + 1,
                    entry.title,
                    context.summary
                ));
            }
        }

        if blocks.is_empty() {
            return Err(StorageError::not_found("Chapter summaries", novel_id));
        }

        Ok(FullBookSummary {
            chapter_count: blocks.len(),
            text: blocks.join("\n\n"),
        })
    }

    /// 统计各章节的摘要处理状态
    pub async fn summary_progress(&self, novel_id: &str) -> StorageResult<SummaryProgress> {
        let index = self.storage.load_chapter_index(novel_id).await?;
        let mut progress = SummaryProgress {
            total: index.len(),
            ..Default::default()
        };

        for entry in &index.chapters {
            match self.storage.load_ai_context(novel_id, &entry.id).await? {
                None => progress.pending += 1,
                Some(context) => match context.ai_processing_status {
                    AiProcessingStatus::Completed => progress.completed += 1,
                    AiProcessingStatus::Processing => progress.processing += 1,
                    AiProcessingStatus::Failed => progress.failed += 1,
                },
            }
        }

        Ok(progress)
    }

    fn gate_for(&self, key: &SummaryKey) -> Arc<Mutex<()>> {
        self.in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 持有本章节锁的前提下执行实际生成
    async fn generate_summary(
        &self,
        novel_id: &str,
        chapter_id: &str,
        current_content: &str,
        options: &SummaryOptions,
    ) -> StorageResult<SummaryOutcome> {
        let content_hash = Fingerprint::from_text(current_content);

        if !options.force {
            if let Some(context) = self.storage.load_ai_context(novel_id, chapter_id).await? {
                if context.is_fresh_for(&content_hash) {
                    tracing::debug!(
                        novel_id = %novel_id,
                        chapter_id = %chapter_id,
                        "Content unchanged, reusing stored summary"
                    );
                    return Ok(SummaryOutcome {
                        context,
                        from_cache: true,
                    });
                }
            }
        }

        // 外呼前先落盘 processing，崩溃后留下可观测、可恢复的状态
        self.storage
            .save_ai_context(
                novel_id,
                chapter_id,
                AiContext::processing(chapter_id, content_hash.clone()),
            )
            .await?;

        let world_book = self.storage.load_world_book(novel_id).await?;
        let prompt = build_summary_prompt(
            current_content,
            &world_book.prompt_fragment(),
            options.custom_prompt.as_deref(),
        );

        let ai_config = self.storage.load_ai_config(novel_id).await?;
        let summary_config = ai_config.summary_config;

        let request = GenerateRequest {
            provider: summary_config.provider,
            model: summary_config.model,
            prompt,
            temperature: summary_config.temperature,
            max_tokens: summary_config.max_tokens,
        };

        match self.llm.generate(request).await {
            Ok(response) => {
                let context = self
                    .storage
                    .save_ai_context(
                        novel_id,
                        chapter_id,
                        AiContext::completed(
                            chapter_id,
                            content_hash,
                            response.text.trim().to_string(),
                        ),
                    )
                    .await?;

                tracing::info!(
                    novel_id = %novel_id,
                    chapter_id = %chapter_id,
                    summary_len = context.summary.len(),
                    "Chapter summary generated"
                );
                Ok(SummaryOutcome {
                    context,
                    from_cache: false,
                })
            }
            Err(error) => {
                // 先落盘失败状态再向外传播，UI 始终能看到最近一次结果
                self.storage
                    .save_ai_context(
                        novel_id,
                        chapter_id,
                        AiContext::failed(chapter_id, content_hash, error.to_string()),
                    )
                    .await?;

                tracing::warn!(
                    novel_id = %novel_id,
                    chapter_id = %chapter_id,
                    error = %error,
                    "Chapter summary generation failed"
                );
                Err(StorageError::ExternalService(error))
            }
        }
    }
}

/// 构建摘要提示词：基础指示 + 世界观参考 + 章节正文 + 额外要求
fn build_summary_prompt(content: &str, world_book_info: &str, custom: Option<&str>) -> String {
    let mut prompt = String::from(
        "请为以下章节内容生成一个简洁的摘要，重点突出：\n\
         1. 主要情节发展\n\
         2. 人物动态和关系变化\n\
         3. 关键事件和转折点\n\
         4. 重要的世界观设定\n\
         \n\
         要求：\n\
         - 摘要长度控制在200字以内\n\
         - 突出重点，避免细节描述\n\
         - 保持客观中性的语调\n\
         - 如果内容较短，可以适当简化",
    );

    if !world_book_info.is_empty() {
        prompt.push_str(&format!("\n\n【世界观设定参考】：\n{}", world_book_info));
    }

    prompt.push_str(&format!("\n\n【章节内容】：\n{}", content));

    if let Some(custom) = custom {
        prompt.push_str(&format!("\n\n额外要求：{}", custom));
    }

    prompt
}
