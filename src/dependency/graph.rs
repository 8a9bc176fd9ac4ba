// ==========================================
// 组织数据导入 - 实体依赖图
// ==========================================
// 职责: 声明实体类型之间的依赖关系（静态配置,进程内只读共享）
// 红线: 自引用依赖需要记录,但不产生排序边
// ==========================================

use crate::dependency::error::{DependencyError, DependencyResult};
use crate::domain::dependency::EntityDependency;
use crate::domain::types::EntityType;
use std::collections::HashMap;

// ==========================================
// EntityDependencyGraph - 实体依赖图
// ==========================================
#[derive(Debug, Clone)]
pub struct EntityDependencyGraph {
    declared: Vec<EntityType>, // 声明顺序（排序确定性依赖于此）
    dependencies: HashMap<EntityType, Vec<EntityDependency>>,
}

impl EntityDependencyGraph {
    /// 创建空图（用于自定义配置）
    pub fn empty() -> Self {
        Self {
            declared: Vec::new(),
            dependencies: HashMap::new(),
        }
    }

    /// 声明实体类型（重复声明忽略）
    pub fn declare(mut self, entity_type: EntityType) -> Self {
        if !self.declared.contains(&entity_type) {
            self.declared.push(entity_type);
            self.dependencies.entry(entity_type).or_default();
        }
        self
    }

    /// 添加依赖（依赖方未声明时自动声明）
    pub fn with_dependency(mut self, dependency: EntityDependency) -> Self {
        self = self.declare(dependency.entity_type);
        self.dependencies
            .entry(dependency.entity_type)
            .or_default()
            .push(dependency);
        self
    }

    /// 已声明的实体类型（声明顺序）
    pub fn entity_types(&self) -> &[EntityType] {
        &self.declared
    }

    pub fn contains(&self, entity_type: EntityType) -> bool {
        self.dependencies.contains_key(&entity_type)
    }

    pub(crate) fn ensure_known(&self, entity_type: EntityType) -> DependencyResult<()> {
        if self.contains(entity_type) {
            Ok(())
        } else {
            Err(DependencyError::InvalidEntityType(entity_type.to_string()))
        }
    }

    /// 获取实体类型的全部依赖（含自引用）
    pub fn get_dependencies(&self, entity_type: EntityType) -> DependencyResult<&[EntityDependency]> {
        self.dependencies
            .get(&entity_type)
            .map(Vec::as_slice)
            .ok_or_else(|| DependencyError::InvalidEntityType(entity_type.to_string()))
    }

    /// 是否声明了自引用依赖
    pub fn is_self_referential(&self, entity_type: EntityType) -> DependencyResult<bool> {
        Ok(self
            .get_dependencies(entity_type)?
            .iter()
            .any(EntityDependency::is_self_reference))
    }

    /// 反向查找: 哪些实体类型依赖于给定类型（不含自身,声明顺序）
    pub fn get_dependents(&self, entity_type: EntityType) -> DependencyResult<Vec<EntityType>> {
        self.ensure_known(entity_type)?;

        Ok(self
            .declared
            .iter()
            .copied()
            .filter(|&candidate| candidate != entity_type)
            .filter(|candidate| {
                self.dependencies[candidate]
                    .iter()
                    .any(|dep| dep.depends_on == entity_type)
            })
            .collect())
    }
}

impl Default for EntityDependencyGraph {
    /// 组织数据导入的标准依赖图
    fn default() -> Self {
        use EntityType::*;

        EntityDependencyGraph::empty()
            .declare(UnitType)
            .with_dependency(EntityDependency::new(
                UnitTypeTheme,
                UnitType,
                "unit_type_id",
                false,
                "主题归属于单元类型",
            ))
            .with_dependency(EntityDependency::new(
                Unit,
                UnitType,
                "unit_type_id",
                false,
                "单元必须指定单元类型",
            ))
            .with_dependency(EntityDependency::new(
                Unit,
                Unit,
                "parent_id",
                true,
                "上级单元（层级自引用）",
            ))
            .declare(JobTitle)
            .declare(Person)
            .with_dependency(EntityDependency::new(
                Assignment,
                Person,
                "person_id",
                false,
                "任职人员",
            ))
            .with_dependency(EntityDependency::new(
                Assignment,
                Unit,
                "unit_id",
                false,
                "任职单元",
            ))
            .with_dependency(EntityDependency::new(
                Assignment,
                JobTitle,
                "job_title_id",
                false,
                "任职职位",
            ))
    }
}
