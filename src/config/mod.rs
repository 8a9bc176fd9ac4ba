// ==========================================
// 组织数据导入 - 配置层
// ==========================================
// 职责: 解析引擎的可调配置（自然键、ID 字段、空值策略）
// 存储: JSON 文件 或 config_kv 表
// ==========================================

pub mod resolver_config;

// 重导出核心配置
pub use resolver_config::{is_identifier, ConfigError, ResolverConfig, RESOLVER_CONFIG_KEY};
