// ==========================================
// 组织数据导入 - 临时 ID 登记表
// ==========================================
// 职责: 导入批次内 临时 ID → 持久化 ID 映射
// 生命周期: 单次导入独占,导入结束显式清空
// 冲突策略: 相同映射重复登记为幂等;同一临时 ID 改指其他持久化 ID 直接拒绝
// ==========================================

use crate::dependency::error::{DependencyError, DependencyResult};
use crate::domain::types::EntityType;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct TemporaryIdRegistry {
    mappings: HashMap<EntityType, HashMap<String, i64>>,
}

impl TemporaryIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记临时 ID 映射
    ///
    /// # 返回
    /// - Ok(()): 新登记或与已有映射一致
    /// - Err(ConflictingTemporaryId): 同一临时 ID 已映射到不同持久化 ID（原映射保留）
    pub fn add_mapping(
        &mut self,
        entity_type: EntityType,
        temp_id: &str,
        persisted_id: i64,
    ) -> DependencyResult<()> {
        let bucket = self.mappings.entry(entity_type).or_default();
        match bucket.get(temp_id) {
            Some(&existing) if existing != persisted_id => {
                Err(DependencyError::ConflictingTemporaryId {
                    entity_type,
                    temp_id: temp_id.to_string(),
                    existing,
                    attempted: persisted_id,
                })
            }
            Some(_) => Ok(()),
            None => {
                bucket.insert(temp_id.to_string(), persisted_id);
                tracing::debug!(%entity_type, temp_id, persisted_id, "登记临时 ID");
                Ok(())
            }
        }
    }

    pub fn resolve(&self, entity_type: EntityType, temp_id: &str) -> Option<i64> {
        self.mappings
            .get(&entity_type)
            .and_then(|bucket| bucket.get(temp_id))
            .copied()
    }

    /// 返回副本,调用方无法通过返回值修改内部状态
    pub fn get_all(&self, entity_type: EntityType) -> HashMap<String, i64> {
        self.mappings.get(&entity_type).cloned().unwrap_or_default()
    }

    /// 各实体类型的映射条数
    pub fn counts(&self) -> impl Iterator<Item = (EntityType, usize)> + '_ {
        self.mappings.iter().map(|(&t, bucket)| (t, bucket.len()))
    }

    pub fn clear(&mut self) {
        self.mappings.clear();
    }
}
