//! Application Ports - 端口定义

pub mod llm_engine;

pub use llm_engine::{GenerateRequest, GenerateResponse, LlmEnginePort, LlmError};
