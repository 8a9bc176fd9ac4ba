// ==========================================
// 组织数据导入 - 外键映射目录
// ==========================================
// 职责: 每种实体类型的外键字段 → 目标实体映射（静态配置）
// ==========================================

use crate::dependency::error::{DependencyError, DependencyResult};
use crate::domain::dependency::ForeignKeyMapping;
use crate::domain::types::EntityType;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ForeignKeyCatalog {
    mappings: HashMap<EntityType, Vec<ForeignKeyMapping>>,
}

impl ForeignKeyCatalog {
    pub fn empty() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    /// 登记实体类型（无外键时也需登记,否则视为未知类型）
    pub fn register(mut self, entity_type: EntityType) -> Self {
        self.mappings.entry(entity_type).or_default();
        self
    }

    pub fn with_mapping(mut self, entity_type: EntityType, mapping: ForeignKeyMapping) -> Self {
        self.mappings.entry(entity_type).or_default().push(mapping);
        self
    }

    /// 遍历全部登记的实体类型及其映射（顺序不保证）
    pub fn iter(&self) -> impl Iterator<Item = (EntityType, &[ForeignKeyMapping])> + '_ {
        self.mappings.iter().map(|(&t, m)| (t, m.as_slice()))
    }

    /// 获取外键映射（0..N 条,声明顺序）
    pub fn get_foreign_key_mappings(
        &self,
        entity_type: EntityType,
    ) -> DependencyResult<&[ForeignKeyMapping]> {
        self.mappings
            .get(&entity_type)
            .map(Vec::as_slice)
            .ok_or_else(|| DependencyError::InvalidEntityType(entity_type.to_string()))
    }
}

impl Default for ForeignKeyCatalog {
    fn default() -> Self {
        use EntityType::*;

        ForeignKeyCatalog::empty()
            .register(UnitType)
            .with_mapping(UnitTypeTheme, ForeignKeyMapping::required("unit_type_id", UnitType))
            .with_mapping(Unit, ForeignKeyMapping::required("unit_type_id", UnitType))
            .with_mapping(Unit, ForeignKeyMapping::optional("parent_id", Unit))
            .register(JobTitle)
            .register(Person)
            .with_mapping(Assignment, ForeignKeyMapping::required("person_id", Person))
            .with_mapping(Assignment, ForeignKeyMapping::required("unit_id", Unit))
            .with_mapping(Assignment, ForeignKeyMapping::required("job_title_id", JobTitle))
    }
}
