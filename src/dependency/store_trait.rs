// ==========================================
// 组织数据导入 - 实体存储 Trait
// ==========================================
// 职责: 定义外部实体存储的查询接口（不包含实现）
// 红线: 引擎只做存在性校验与自然键查找,不写存储
// ==========================================

use crate::domain::types::EntityType;
use thiserror::Error;

/// 实体存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("数据库查询失败: {0}")]
    Database(String),

    #[error("不支持的自然键字段 (实体 {entity}, 字段 {field})")]
    UnsupportedField { entity: EntityType, field: String },

    #[error("存储锁获取失败: {0}")]
    LockError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Result 类型别名
pub type StoreResult<T> = Result<T, StoreError>;

// ==========================================
// EntityStore Trait
// ==========================================
// 用途: 依赖解析引擎唯一的外部 I/O 边界
// 实现者: InMemoryEntityStore, SqliteEntityStore
pub trait EntityStore: Send + Sync {
    /// 检查持久化 ID 是否存在
    ///
    /// # 参数
    /// - entity_type: 实体类型
    /// - id: 持久化 ID
    ///
    /// # 返回
    /// - Ok(true): 存在
    /// - Ok(false): 不存在
    /// - Err: 存储错误（原样透传给调用方）
    fn exists(&self, entity_type: EntityType, id: i64) -> StoreResult<bool>;

    /// 按自然键查找持久化 ID
    ///
    /// # 参数
    /// - entity_type: 实体类型
    /// - field: 自然键字段（如 name / short_name）
    /// - value: 字段值
    ///
    /// # 返回
    /// - Ok(Some(id)): 找到
    /// - Ok(None): 未找到
    fn find_by_natural_key(
        &self,
        entity_type: EntityType,
        field: &str,
        value: &str,
    ) -> StoreResult<Option<i64>>;
}
