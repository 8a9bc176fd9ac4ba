// ==========================================
// 组织数据导入 - 依赖与外键映射模型
// ==========================================
// 职责: 声明式依赖边 + 外键字段映射
// 红线: 纯数据结构,不含解析逻辑
// ==========================================

use crate::domain::types::EntityType;
use serde::{Deserialize, Serialize};

// ==========================================
// EntityDependency - 实体依赖
// ==========================================
// 自引用依赖（depends_on == entity_type）参与外键解析,但不进入排序图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDependency {
    pub entity_type: EntityType,     // 依赖方
    pub depends_on: EntityType,      // 被依赖方
    pub foreign_key_field: String,   // 承载引用的字段
    pub is_optional: bool,           // 可选依赖（缺失不报错）
    pub description: String,         // 说明
}

impl EntityDependency {
    pub fn new(
        entity_type: EntityType,
        depends_on: EntityType,
        foreign_key_field: &str,
        is_optional: bool,
        description: &str,
    ) -> Self {
        Self {
            entity_type,
            depends_on,
            foreign_key_field: foreign_key_field.to_string(),
            is_optional,
            description: description.to_string(),
        }
    }

    pub fn is_self_reference(&self) -> bool {
        self.entity_type == self.depends_on
    }
}

// ==========================================
// ForeignKeyMapping - 外键字段映射
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyMapping {
    pub source_field: String,      // 记录中的源字段
    pub target_entity: EntityType, // 目标实体类型
    pub target_field: String,      // 目标字段（默认 id;非 id 时优先按该字段查找）
    pub is_required: bool,         // 必填（默认 true）
    pub allow_temporary_ids: bool, // 允许临时 ID（默认 true）
}

impl ForeignKeyMapping {
    /// 必填、允许临时 ID、指向目标 id 的映射
    pub fn required(source_field: &str, target_entity: EntityType) -> Self {
        Self {
            source_field: source_field.to_string(),
            target_entity,
            target_field: "id".to_string(),
            is_required: true,
            allow_temporary_ids: true,
        }
    }

    pub fn optional(source_field: &str, target_entity: EntityType) -> Self {
        Self {
            is_required: false,
            ..Self::required(source_field, target_entity)
        }
    }

    /// 只接受已持久化 ID / 自然键,不查临时映射
    pub fn without_temporary_ids(mut self) -> Self {
        self.allow_temporary_ids = false;
        self
    }

    /// 外键值引用目标实体的其他字段（如 short_name）
    pub fn referencing(mut self, target_field: &str) -> Self {
        self.target_field = target_field.to_string();
        self
    }
}
