// ==========================================
// 组织数据导入 - 依赖解析核心库
// ==========================================
// 职责: 批量导入组织数据（单元类型/单元/人员/职位/任职）时
//       确定实体处理顺序、解析外键、提供预检
// 系统定位: 纯内存计算,唯一外部 I/O 为 EntityStore 查询
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 类型与声明
pub mod domain;

// 依赖解析层 - 处理顺序 / 外键解析
pub mod dependency;

// 存储适配层 - EntityStore 实现
pub mod store;

// 配置层
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    DryRunReport, EntityDependency, EntityType, ForeignKeyMapping, ImportData, LocalMappings,
    Record, ResolutionStatistics, Scalar,
};

pub use dependency::{
    DependencyError, DependencyResolver, DependencyResult, EntityDependencyGraph, EntityStore,
    ExistingEntityCache, ForeignKeyCatalog, ForeignKeyResolver, ImportContext,
    ProcessingOrderResolver, ReferenceMap, StoreError, StoreResult, TemporaryIdRegistry,
};

pub use config::{ConfigError, ResolverConfig};

pub use store::{InMemoryEntityStore, SqliteEntityStore};

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_resolver_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DependencyResolver>();
        assert_send_sync::<ImportContext>();
    }
}
