// ==========================================
// 组织数据导入 - 依赖解析错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 配置错误（类型/环） · 记录数据错误（外键） · 存储错误（原样透传）
// ==========================================

use crate::config::ConfigError;
use crate::dependency::store_trait::StoreError;
use crate::domain::types::{EntityType, Scalar};
use thiserror::Error;

/// 依赖解析错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    // ===== 配置错误（调用方/配置缺陷,不重试）=====
    #[error("无效的实体类型: {0}")]
    InvalidEntityType(String),

    #[error("检测到循环依赖: {}", format_cycle(.cycle))]
    CircularDependency { cycle: Vec<EntityType> },

    // ===== 记录数据错误（由编排方决定跳过/中止）=====
    #[error("缺少必填外键 (实体 {entity_type}, 字段 {field})")]
    MissingRequiredForeignKey { entity_type: EntityType, field: String },

    #[error("无法解析外键 (实体 {entity_type}, 字段 {field}, 值 {value})")]
    UnresolvedForeignKey {
        entity_type: EntityType,
        field: String,
        value: Scalar,
    },

    #[error("临时 ID 冲突 (实体 {entity_type}, 临时 ID {temp_id}): 已映射到 {existing}, 拒绝改为 {attempted}")]
    ConflictingTemporaryId {
        entity_type: EntityType,
        temp_id: String,
        existing: i64,
        attempted: i64,
    },

    #[error("第 {index} 条记录解析失败: {source}")]
    RecordFailed {
        index: usize,
        #[source]
        source: Box<DependencyError>,
    },

    // ===== 外部协作方错误 =====
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DependencyError {
    /// 配置类错误需要修正配置,不应按记录跳过
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DependencyError::InvalidEntityType(_)
                | DependencyError::CircularDependency { .. }
                | DependencyError::Config(_)
        )
    }

    /// 单条记录的数据错误（可由编排方跳过）
    pub fn is_record_error(&self) -> bool {
        match self {
            DependencyError::MissingRequiredForeignKey { .. }
            | DependencyError::UnresolvedForeignKey { .. }
            | DependencyError::ConflictingTemporaryId { .. } => true,
            DependencyError::RecordFailed { source, .. } => source.is_record_error(),
            _ => false,
        }
    }
}

fn format_cycle(cycle: &[EntityType]) -> String {
    cycle
        .iter()
        .map(EntityType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result 类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
