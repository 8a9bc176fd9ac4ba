// ==========================================
// 组织数据导入 - 导入运行上下文
// ==========================================
// 职责: 承载单次导入独占的可变状态（临时 ID 登记表 + 存在性缓存）
// 红线: 调用方持有并逐次传入;并发导入各自创建,禁止共享
// ==========================================

use crate::dependency::entity_cache::ExistingEntityCache;
use crate::dependency::temp_registry::TemporaryIdRegistry;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ImportContext {
    pub run_id: Uuid,
    pub registry: TemporaryIdRegistry,
    pub cache: ExistingEntityCache,
}

impl ImportContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            registry: TemporaryIdRegistry::new(),
            cache: ExistingEntityCache::new(),
        }
    }

    /// 清空临时映射与缓存（run_id 保持不变）
    pub fn clear(&mut self) {
        self.registry.clear();
        self.cache.clear();
    }
}

impl Default for ImportContext {
    fn default() -> Self {
        Self::new()
    }
}
