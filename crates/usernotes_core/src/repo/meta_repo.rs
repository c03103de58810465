//! Item metadata repository.
//!
//! # Invariants
//! - Values for one (item, key) are returned in insertion order.
//! - Reads never create rows.

use crate::model::record::ItemId;
use crate::repo::record_repo::{ensure_table, RepoResult};
use rusqlite::{params, Connection};

/// Repository interface for multi-valued item metadata.
pub trait ItemMetaRepository {
    fn get_meta(&self, item_id: ItemId, key: &str) -> RepoResult<Vec<String>>;
    fn add_meta(&self, item_id: ItemId, key: &str, value: &str) -> RepoResult<()>;
    fn count_meta_rows(&self, item_id: ItemId) -> RepoResult<u64>;
}

/// SQLite-backed item metadata repository.
pub struct SqliteItemMetaRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemMetaRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "item_meta")?;
        Ok(Self { conn })
    }
}

impl ItemMetaRepository for SqliteItemMetaRepository<'_> {
    fn get_meta(&self, item_id: ItemId, key: &str) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT meta_value
             FROM item_meta
             WHERE item_id = ?1 AND meta_key = ?2
             ORDER BY meta_id ASC;",
        )?;
        let mut rows = stmt.query(params![item_id, key])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(row.get(0)?);
        }
        Ok(values)
    }

    fn add_meta(&self, item_id: ItemId, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO item_meta (item_id, meta_key, meta_value) VALUES (?1, ?2, ?3);",
            params![item_id, key, value],
        )?;
        Ok(())
    }

    fn count_meta_rows(&self, item_id: ItemId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM item_meta WHERE item_id = ?1;",
            [item_id],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}
