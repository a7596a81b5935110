//! Record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `records`, scoped by owner or by cow.
//!
//! # Invariants
//! - Single-row reads/writes always constrain `owner_id`.
//! - Cow ownership of `cow_id` is not checked here; the record service
//!   verifies it before any write.

use super::{
    ensure_connection_ready, push_plan_ordering, push_plan_predicates, RepoError, RepoResult,
};
use crate::filter::FilterPlan;
use crate::model::record::{Record, RecordFields};
use crate::model::{CowId, OwnerId, RecordId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const RECORD_TABLE: &str = "records";
const RECORD_COLUMNS: &[&str] = &[
    "id",
    "owner_id",
    "cow_id",
    "content",
    "etc",
    "day",
    "created_at",
];

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    cow_id,
    content,
    etc,
    day,
    created_at
FROM records";

/// Base row set a record listing starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScope {
    /// Every record of one owner.
    Owner(OwnerId),
    /// Every record attached to one cow; the caller has already checked
    /// that the cow belongs to the acting owner.
    Cow(CowId),
}

/// Repository interface for record operations.
pub trait RecordRepository {
    fn create_record(&self, owner_id: OwnerId, fields: &RecordFields) -> RepoResult<RecordId>;
    fn update_record(
        &self,
        owner_id: OwnerId,
        id: RecordId,
        fields: &RecordFields,
    ) -> RepoResult<()>;
    fn get_record(&self, owner_id: OwnerId, id: RecordId) -> RepoResult<Option<Record>>;
    fn list_records(&self, scope: RecordScope, plan: &FilterPlan) -> RepoResult<Vec<Record>>;
    fn delete_record(&self, owner_id: OwnerId, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, RECORD_TABLE, RECORD_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn create_record(&self, owner_id: OwnerId, fields: &RecordFields) -> RepoResult<RecordId> {
        self.conn.execute(
            "INSERT INTO records (
                owner_id,
                cow_id,
                content,
                etc,
                day
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                owner_id,
                fields.cow_id,
                fields.content.as_str(),
                fields.etc.as_deref(),
                fields.day,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_record(
        &self,
        owner_id: OwnerId,
        id: RecordId,
        fields: &RecordFields,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE records
             SET
                cow_id = ?1,
                content = ?2,
                etc = ?3,
                day = ?4
             WHERE id = ?5
               AND owner_id = ?6;",
            params![
                fields.cow_id,
                fields.content.as_str(),
                fields.etc.as_deref(),
                fields.day,
                id,
                owner_id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "record",
                id,
            });
        }

        Ok(())
    }

    fn get_record(&self, owner_id: OwnerId, id: RecordId) -> RepoResult<Option<Record>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE id = ?1
               AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id, owner_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }

        Ok(None)
    }

    fn list_records(&self, scope: RecordScope, plan: &FilterPlan) -> RepoResult<Vec<Record>> {
        let (scope_sql, scope_id) = match scope {
            RecordScope::Owner(owner_id) => ("owner_id = ?", owner_id),
            RecordScope::Cow(cow_id) => ("cow_id = ?", cow_id),
        };
        let mut sql = format!("{RECORD_SELECT_SQL} WHERE {scope_sql}");
        let mut bind_values: Vec<Value> = vec![Value::Integer(scope_id)];
        push_plan_predicates(&mut sql, &mut bind_values, plan);
        push_plan_ordering(&mut sql, plan);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }

    fn delete_record(&self, owner_id: OwnerId, id: RecordId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM records WHERE id = ?1 AND owner_id = ?2;",
            params![id, owner_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "record",
                id,
            });
        }

        Ok(())
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<Record> {
    Ok(Record {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        cow_id: row.get("cow_id")?,
        content: row.get("content")?,
        etc: row.get("etc")?,
        day: row.get("day")?,
        created_at: row.get("created_at")?,
    })
}
