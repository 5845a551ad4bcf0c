//! AI Configuration - 每部小说的 AI 配置
//!
//! 两个用例（内容重写、摘要生成）各自的 provider/model/温度/输出长度。
//! 小说没有独立配置文件时使用进程级默认值。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AI 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "UseCaseConfig::rewrite_default")]
    pub rewrite_config: UseCaseConfig,
    #[serde(default = "UseCaseConfig::summary_default")]
    pub summary_config: UseCaseConfig,
    pub updated_at: DateTime<Utc>,
}

/// 单个用例的生成参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseCaseConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl UseCaseConfig {
    /// 内容重写的默认参数
    pub fn rewrite_default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    /// 摘要生成的默认参数
    pub fn summary_default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: 0.3,
            max_tokens: 1000,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_model: default_model(),
            rewrite_config: UseCaseConfig::rewrite_default(),
            summary_config: UseCaseConfig::summary_default(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AiConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.summary_config.temperature, 0.3);
        assert_eq!(config.summary_config.max_tokens, 1000);
        assert_eq!(config.rewrite_config.temperature, 0.7);
        assert_eq!(config.rewrite_config.max_tokens, 2000);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let json = r#"{"updatedAt":"2024-01-01T00:00:00Z"}"#;
        let config: AiConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.summary_config.model, "gpt-3.5-turbo");
    }
}
