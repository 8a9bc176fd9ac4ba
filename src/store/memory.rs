// ==========================================
// 组织数据导入 - 内存实体存储
// ==========================================
// 用途: 单元测试 / 预检场景下的 EntityStore 实现
// 说明: 构造后只读;记录 exists 调用次数,便于校验缓存记忆化
// ==========================================

use crate::dependency::store_trait::{EntityStore, StoreError, StoreResult};
use crate::domain::types::EntityType;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    ids: HashMap<EntityType, HashSet<i64>>,
    natural_keys: HashMap<(EntityType, String, String), i64>,
    failure: Option<String>,
    exists_calls: AtomicUsize,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity_type: EntityType, id: i64) -> Self {
        self.ids.entry(entity_type).or_default().insert(id);
        self
    }

    pub fn with_natural_key(
        mut self,
        entity_type: EntityType,
        field: &str,
        value: &str,
        id: i64,
    ) -> Self {
        self.natural_keys
            .insert((entity_type, field.to_string(), value.to_string()), id);
        self
    }

    /// 所有查询均返回存储错误（用于验证错误透传）
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> StoreResult<()> {
        match &self.failure {
            Some(message) => Err(StoreError::Database(message.clone())),
            None => Ok(()),
        }
    }
}

impl EntityStore for InMemoryEntityStore {
    fn exists(&self, entity_type: EntityType, id: i64) -> StoreResult<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self
            .ids
            .get(&entity_type)
            .is_some_and(|ids| ids.contains(&id)))
    }

    fn find_by_natural_key(
        &self,
        entity_type: EntityType,
        field: &str,
        value: &str,
    ) -> StoreResult<Option<i64>> {
        self.check_failure()?;
        Ok(self
            .natural_keys
            .get(&(entity_type, field.to_string(), value.to_string()))
            .copied())
    }
}
