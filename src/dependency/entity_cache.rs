// ==========================================
// 组织数据导入 - 已存在实体缓存
// ==========================================
// 职责: 记忆化存在性校验,同一 (实体类型, ID) 只查询存储一次
// 红线: 不假设正整数 ID 必然存在,一律委托存储判断
// 红线: 单次导入独占;存储可能已变化时必须 clear
// ==========================================

use crate::dependency::store_trait::{EntityStore, StoreResult};
use crate::domain::types::EntityType;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ExistingEntityCache {
    cache: HashMap<EntityType, HashMap<i64, bool>>,
}

impl ExistingEntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 校验持久化 ID 是否存在（记忆化）
    ///
    /// # 说明
    /// - 命中缓存直接返回
    /// - 未命中时调用 EntityStore::exists,结果（含 false）写入缓存
    /// - 存储错误原样返回,不写缓存
    pub fn validate_existing_id(
        &mut self,
        store: &dyn EntityStore,
        entity_type: EntityType,
        id: i64,
    ) -> StoreResult<bool> {
        if let Some(&known) = self.cache.get(&entity_type).and_then(|bucket| bucket.get(&id)) {
            return Ok(known);
        }

        let exists = store.exists(entity_type, id)?;
        self.cache.entry(entity_type).or_default().insert(id, exists);
        Ok(exists)
    }

    /// 预热: 仅建立空缓存桶
    pub fn preload(&mut self, entity_types: &[EntityType]) {
        for &entity_type in entity_types {
            self.cache.entry(entity_type).or_default();
        }
    }

    pub fn counts(&self) -> impl Iterator<Item = (EntityType, usize)> + '_ {
        self.cache.iter().map(|(&t, bucket)| (t, bucket.len()))
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
