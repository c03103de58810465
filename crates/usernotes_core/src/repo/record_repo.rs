//! Record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide generic CRUD over the shared `records` table.
//! - Provide the (item, author, kind) lookup every note component reuses.
//!
//! # Invariants
//! - Anonymous authors are stored as `0` and read back as `None`.
//! - Listings are ordered by `created_at ASC, id ASC`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::record::{ItemId, NewRecord, Record, RecordId, RecordPatch, UserId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    item_id,
    author_id,
    kind,
    body,
    status,
    created_at
FROM records";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record and metadata persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(RecordId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "record store is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the generic record store.
pub trait RecordRepository {
    /// Inserts one record and returns its host-assigned id.
    fn insert_record(&self, record: &NewRecord) -> RepoResult<RecordId>;
    /// Applies a patch; `None` patch fields keep stored values.
    fn update_record(&self, id: RecordId, patch: &RecordPatch) -> RepoResult<()>;
    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>>;
    /// Lists every record attached to one item, all kinds included.
    fn list_for_item(&self, item_id: ItemId) -> RepoResult<Vec<Record>>;
    /// Returns the oldest record matching (item, author, kind), if any.
    fn find_first(
        &self,
        item_id: ItemId,
        author_id: UserId,
        kind: &str,
    ) -> RepoResult<Option<Record>>;
    /// Storage-level count for one item; never filtered by visibility.
    fn count_for_item(&self, item_id: ItemId) -> RepoResult<u64>;
    fn delete_record(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "records")?;
        Ok(Self { conn })
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn insert_record(&self, record: &NewRecord) -> RepoResult<RecordId> {
        self.conn.execute(
            "INSERT INTO records (item_id, author_id, kind, body, status)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                record.item_id,
                author_to_db(record.author_id),
                record.kind.as_str(),
                record.body.as_str(),
                record.status.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_record(&self, id: RecordId, patch: &RecordPatch) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE records
             SET
                body = COALESCE(?2, body),
                author_id = COALESCE(?3, author_id),
                status = COALESCE(?4, status)
             WHERE id = ?1;",
            params![
                id,
                patch.body.as_deref(),
                patch.author_id,
                patch.status.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }
        Ok(None)
    }

    fn list_for_item(&self, item_id: ItemId) -> RepoResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL} WHERE item_id = ?1 ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([item_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn find_first(
        &self,
        item_id: ItemId,
        author_id: UserId,
        kind: &str,
    ) -> RepoResult<Option<Record>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE item_id = ?1
               AND author_id = ?2
               AND kind = ?3
             ORDER BY created_at ASC, id ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![item_id, author_id, kind])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }
        Ok(None)
    }

    fn count_for_item(&self, item_id: ItemId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE item_id = ?1;",
            [item_id],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative record count `{count}`")))
    }

    fn delete_record(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM records WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<Record> {
    let id: RecordId = row.get("id")?;
    let author_raw: i64 = row.get("author_id")?;
    if author_raw < 0 {
        return Err(RepoError::InvalidData(format!(
            "invalid author_id `{author_raw}` in records.author_id for record {id}"
        )));
    }

    let kind: String = row.get("kind")?;
    if kind.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty kind in records.kind for record {id}"
        )));
    }

    Ok(Record {
        id,
        item_id: row.get("item_id")?,
        author_id: author_from_db(author_raw),
        kind,
        body: row.get("body")?,
        status: row.get("status")?,
        created_at: row.get("created_at")?,
    })
}

fn author_to_db(author_id: Option<UserId>) -> i64 {
    author_id.unwrap_or(0)
}

fn author_from_db(value: i64) -> Option<UserId> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

pub(crate) fn ensure_table(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::MissingRequiredTable(table))
    }
}
