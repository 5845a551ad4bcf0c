//! LLM Adapters - 生成服务适配器
//!
//! 具体 AI 服务商的 HTTP 客户端在本 crate 之外；这里只提供测试替身。

pub mod fake_llm_client;

pub use fake_llm_client::FakeLlmClient;
