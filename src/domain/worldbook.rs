//! World Book - 世界书
//!
//! 每部小说一份的世界观设定，构建摘要提示词时作为只读上下文使用。
//! 文件缺失时返回空的默认结构，不是错误。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 世界书
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldBook {
    #[serde(default)]
    pub settings: WorldSettings,
    pub updated_at: DateTime<Utc>,
}

impl Default for WorldBook {
    fn default() -> Self {
        Self {
            settings: WorldSettings::default(),
            updated_at: Utc::now(),
        }
    }
}

/// 世界观设定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSettings {
    #[serde(default)]
    pub world: WorldSetting,
    #[serde(default)]
    pub characters: Vec<CharacterEntry>,
    #[serde(default)]
    pub locations: Vec<NamedEntry>,
    #[serde(default)]
    pub items: Vec<NamedEntry>,
    #[serde(default)]
    pub timeline: Vec<NamedEntry>,
}

/// 世界描述与规则
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSetting {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rules: Vec<String>,
}

/// 人物条目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub traits: Vec<String>,
    /// 描写风格示例
    #[serde(default)]
    pub example: String,
}

/// 地点/物品/时间线的通用条目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl WorldBook {
    /// 渲染用于摘要提示词的世界观参考片段
    ///
    /// 只包含世界描述/规则和名字非空的人物；没有可用信息时返回空串
    pub fn prompt_fragment(&self) -> String {
        let mut parts = Vec::new();
        let world = &self.settings.world;

        if !world.name.is_empty() {
            parts.push(format!("世界名称：{}", world.name));
            if !world.description.is_empty() {
                parts.push(format!("世界描述：{}", world.description));
            }
            if !world.rules.is_empty() {
                parts.push(format!("世界规则：{}", world.rules.join("；")));
            }
        }

        let characters: Vec<String> = self
            .settings
            .characters
            .iter()
            .filter(|c| !c.name.is_empty())
            .map(|c| {
                let mut info = format!("{}：{}", c.name, c.description);
                if !c.example.is_empty() {
                    info.push_str(&format!("\n描写示例：{}", c.example));
                }
                if !c.traits.is_empty() {
                    info.push_str(&format!("\n特征：{}", c.traits.join("、")));
                }
                info
            })
            .collect();

        if !characters.is_empty() {
            parts.push(format!("主要人物：\n{}", characters.join("\n\n")));
        }

        parts.join("\n\n")
    }
}
