// ==========================================
// 组织数据导入 - SQLite 实体存储
// ==========================================
// 职责: 基于 rusqlite 的 EntityStore 实现（只读查询）
// 约定: 每种实体类型一张表,表名 = EntityType::as_str(),主键列 id
// 约束: 值一律参数化;列名仅允许标识符字符
// ==========================================

use anyhow::Context;
use crate::config::is_identifier;
use crate::dependency::store_trait::{EntityStore, StoreError, StoreResult};
use crate::domain::types::EntityType;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

// ==========================================
// SqliteEntityStore
// ==========================================
pub struct SqliteEntityStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEntityStore {
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .with_context(|| format!("打开实体库失败: {}", db_path))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与其他仓储共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))
    }

    /// 建立最小表结构（测试与本地初始化用,幂等）
    pub fn init_schema(&self) -> StoreResult<()> {
        let conn = self.get_conn()?;
        for entity_type in EntityType::ALL {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id INTEGER PRIMARY KEY,
                    name TEXT,
                    short_name TEXT
                );",
                entity_type.as_str()
            ))?;
        }
        Ok(())
    }

    /// 写入一行（测试与本地初始化用）
    pub fn insert(
        &self,
        entity_type: EntityType,
        id: i64,
        name: Option<&str>,
        short_name: Option<&str>,
    ) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, name, short_name) VALUES (?1, ?2, ?3)",
                entity_type.as_str()
            ),
            params![id, name, short_name],
        )?;
        Ok(())
    }
}

impl EntityStore for SqliteEntityStore {
    fn exists(&self, entity_type: EntityType, id: i64) -> StoreResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1 LIMIT 1", entity_type.as_str()),
                params![id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }

    fn find_by_natural_key(
        &self,
        entity_type: EntityType,
        field: &str,
        value: &str,
    ) -> StoreResult<Option<i64>> {
        if !is_identifier(field) {
            return Err(StoreError::UnsupportedField {
                entity: entity_type,
                field: field.to_string(),
            });
        }

        let conn = self.get_conn()?;
        let id = conn
            .query_row(
                &format!(
                    "SELECT id FROM {} WHERE {} = ?1 ORDER BY id LIMIT 1",
                    entity_type.as_str(),
                    field
                ),
                params![value],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id)
    }
}
