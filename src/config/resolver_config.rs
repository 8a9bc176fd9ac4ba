// ==========================================
// 组织数据导入 - 解析器配置
// ==========================================
// 职责: 自然键字段 / 自身 ID 字段 / 空白值策略
// 来源: JSON 文本、JSON 文件、config_kv 表（key = import/resolver_config）
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// config_kv 中存放解析器配置的键
pub const RESOLVER_CONFIG_KEY: &str = "import/resolver_config";

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置读取失败 (key: {key}): {message}")]
    ReadError { key: String, message: String },

    #[error("配置值无效: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// 自然键字段（按顺序尝试）
    pub natural_key_fields: Vec<String>,

    /// 记录自身 ID 字段
    pub id_field: String,

    /// 外键字段中的空白字符串按空值处理
    pub treat_blank_as_null: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            natural_key_fields: vec!["name".to_string(), "short_name".to_string()],
            id_field: "id".to_string(),
            treat_blank_as_null: true,
        }
    }
}

impl ResolverConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ResolverConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// 从 config_kv 表读取（scope_id='global'）,不存在时返回默认配置
    pub fn from_connection(conn: &Connection) -> Result<Self, ConfigError> {
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![RESOLVER_CONFIG_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ConfigError::ReadError {
                key: RESOLVER_CONFIG_KEY.to_string(),
                message: e.to_string(),
            })?;

        match raw {
            Some(raw) => Self::from_json_str(&raw),
            None => Ok(Self::default()),
        }
    }

    /// 字段名只允许标识符字符（字段名会拼入 SQL 列名）
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.id_field) {
            return Err(ConfigError::Invalid(format!(
                "id_field 不是合法字段名: '{}'",
                self.id_field
            )));
        }
        if let Some(bad) = self.natural_key_fields.iter().find(|f| !is_identifier(f)) {
            return Err(ConfigError::Invalid(format!("自然键字段不是合法字段名: '{}'", bad)));
        }
        Ok(())
    }
}

/// 合法标识符: 非空,字母/数字/下划线,且不以数字开头
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
