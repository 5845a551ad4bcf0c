//! LLM Engine Port - 文本生成服务抽象
//!
//! 定义"根据提示词生成文本"的黑盒契约。具体的 AI 服务商 HTTP
//! 客户端在本 crate 之外实现；协调器只依赖成功/分类失败。

use async_trait::async_trait;
use thiserror::Error;

/// LLM 错误
///
/// 按用户可见的失败原因分类；Clone 便于测试替身按脚本返回
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Generation failed: {0}")]
    Unknown(String),
}

/// 生成请求
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// 服务商标识（openai、gemini 等）
    pub provider: String,
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    /// 最大输出长度（token 数）
    pub max_tokens: u32,
}

/// 生成响应
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub text: String,
}

/// LLM Engine Port
#[async_trait]
pub trait LlmEnginePort: Send + Sync {
    /// 执行一次文本生成
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError>;

    /// 检查生成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
