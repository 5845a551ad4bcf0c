//! Fake LLM Client - 用于测试的生成服务替身
//!
//! 返回固定文本或按脚本返回失败，不实际调用任何 AI 服务。
//! 记录调用次数，供去重与失效相关测试断言。

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::{GenerateRequest, GenerateResponse, LlmEnginePort, LlmError};

/// Fake LLM Client
pub struct FakeLlmClient {
    /// 固定返回的文本
    response_text: String,
    /// 模拟生成耗时
    delay: Duration,
    /// 脚本化的失败；Some 时每次调用都返回该错误
    fail_with: Option<LlmError>,
    /// 累计调用次数
    call_count: AtomicUsize,
}

impl FakeLlmClient {
    /// 创建总是成功并返回 `text` 的客户端
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            response_text: text.into(),
            delay: Duration::from_millis(0),
            fail_with: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// 创建总是失败的客户端
    pub fn failing(error: LlmError) -> Self {
        Self {
            response_text: String::new(),
            delay: Duration::from_millis(0),
            fail_with: Some(error),
            call_count: AtomicUsize::new(0),
        }
    }

    /// 设置模拟生成耗时（用于并发去重测试）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 已发生的生成调用次数
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmEnginePort for FakeLlmClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(
            provider = %request.provider,
            model = %request.model,
            prompt_len = request.prompt.len(),
            "FakeLlmClient: generate called"
        );

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(GenerateResponse {
                text: self.response_text.clone(),
            }),
        }
    }
}
