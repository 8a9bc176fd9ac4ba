// ==========================================
// 组织数据导入 - 领域模型层
// ==========================================
// 职责: 定义实体类型、记录标量、依赖/外键声明、报告结构
// 红线: 不含数据访问逻辑,不含解析逻辑
// ==========================================

pub mod dependency;
pub mod report;
pub mod types;

// 重导出核心类型
pub use dependency::{EntityDependency, ForeignKeyMapping};
pub use report::{DryRunReport, ResolutionStatistics};
pub use types::{record_from_json, EntityType, ImportData, LocalMappings, Record, Scalar};
