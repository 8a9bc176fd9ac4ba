// ==========================================
// 组织数据导入 - 实体存储适配层
// ==========================================
// 职责: EntityStore 的具体实现,屏蔽存储细节
// 红线: 只读查询,不含解析逻辑
// ==========================================

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryEntityStore;
pub use sqlite::{configure_sqlite_connection, open_sqlite_connection, SqliteEntityStore};
