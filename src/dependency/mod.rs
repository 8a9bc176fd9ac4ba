// ==========================================
// 组织数据导入 - 依赖解析层
// ==========================================
// 职责: 实体处理顺序 + 外键映射解析 + 预检
// 数据流: 编排方传入 实体类型 → 记录 映射
//   1. ProcessingOrderResolver 依据依赖图给出安全顺序
//   2. 按顺序逐条 ForeignKeyResolver 解析外键（临时 ID / 存在性缓存 / 自然键）
//   3. 编排方落库后把新 ID 登记回 TemporaryIdRegistry,供后续类型引用
// 红线: 不决定失败批次的处理策略（重试/跳过/中止由编排方决定）
// ==========================================

pub mod catalog;
pub mod context;
pub mod entity_cache;
pub mod error;
pub mod fk_resolver;
pub mod graph;
pub mod order;
pub mod resolver;
pub mod store_trait;
pub mod temp_registry;

// 重导出核心类型
pub use catalog::ForeignKeyCatalog;
pub use context::ImportContext;
pub use entity_cache::ExistingEntityCache;
pub use error::{DependencyError, DependencyResult};
pub use fk_resolver::{ForeignKeyResolver, ReferenceMap};
pub use graph::EntityDependencyGraph;
pub use order::ProcessingOrderResolver;
pub use resolver::DependencyResolver;
pub use store_trait::{EntityStore, StoreError, StoreResult};
pub use temp_registry::TemporaryIdRegistry;
