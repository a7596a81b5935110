//! Cow repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD over `cows`.
//! - Resolve mother numbers to cow ids inside one owner's herd; listings
//!   resolve them in the same statement.
//!
//! # Invariants
//! - `(owner_id, number)` is unique; duplicates surface as
//!   `RepoError::UniqueViolation { table: "cows" }`.
//! - Read paths reject rows whose number or sex violates the model.
//! - Deleting a cow removes its records (`ON DELETE CASCADE`).

use super::{
    bool_to_int, classify_write_error, ensure_connection_ready, int_to_bool, push_plan_ordering,
    push_plan_predicates, RepoError, RepoResult,
};
use crate::filter::FilterPlan;
use crate::model::cow::{Cow, CowFields, CowNumber, Sex};
use crate::model::{CowId, OwnerId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const COW_TABLE: &str = "cows";
const COW_COLUMNS: &[&str] = &[
    "id",
    "owner_id",
    "number",
    "sex",
    "birthday",
    "mother_number",
    "is_deleted",
    "created_at",
];

const COW_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    number,
    sex,
    birthday,
    mother_number,
    is_deleted,
    created_at
FROM cows";

const COW_LIST_SQL: &str = "SELECT
    id,
    owner_id,
    number,
    sex,
    birthday,
    mother_number,
    is_deleted,
    created_at,
    (
        SELECT mother.id
        FROM cows AS mother
        WHERE mother.owner_id = cows.owner_id
          AND mother.number = cows.mother_number
    ) AS mother_id
FROM cows";

/// Repository interface for cow operations.
pub trait CowRepository {
    fn create_cow(&self, owner_id: OwnerId, fields: &CowFields) -> RepoResult<CowId>;
    fn update_cow(&self, owner_id: OwnerId, id: CowId, fields: &CowFields) -> RepoResult<()>;
    fn get_cow(&self, owner_id: OwnerId, id: CowId) -> RepoResult<Option<Cow>>;
    /// Owner of any cow, regardless of the acting principal.
    fn cow_owner(&self, id: CowId) -> RepoResult<Option<OwnerId>>;
    /// Id of the owner's cow whose number equals `number`.
    fn find_cow_id_by_number(&self, owner_id: OwnerId, number: &str) -> RepoResult<Option<CowId>>;
    /// Owner's cows matching `plan`, each paired with its mother's id.
    fn list_cows(
        &self,
        owner_id: OwnerId,
        plan: &FilterPlan,
    ) -> RepoResult<Vec<(Cow, Option<CowId>)>>;
    fn delete_cow(&self, owner_id: OwnerId, id: CowId) -> RepoResult<()>;
}

/// SQLite-backed cow repository.
pub struct SqliteCowRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCowRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, COW_TABLE, COW_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl CowRepository for SqliteCowRepository<'_> {
    fn create_cow(&self, owner_id: OwnerId, fields: &CowFields) -> RepoResult<CowId> {
        self.conn
            .execute(
                "INSERT INTO cows (
                    owner_id,
                    number,
                    sex,
                    birthday,
                    mother_number,
                    is_deleted
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    owner_id,
                    fields.number.as_str(),
                    fields.sex.as_str(),
                    fields.birthday,
                    fields.mother_number.as_ref().map(CowNumber::as_str),
                    bool_to_int(fields.deleted),
                ],
            )
            .map_err(|err| classify_write_error(err, COW_TABLE))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_cow(&self, owner_id: OwnerId, id: CowId, fields: &CowFields) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE cows
                 SET
                    number = ?1,
                    sex = ?2,
                    birthday = ?3,
                    mother_number = ?4,
                    is_deleted = ?5
                 WHERE id = ?6
                   AND owner_id = ?7;",
                params![
                    fields.number.as_str(),
                    fields.sex.as_str(),
                    fields.birthday,
                    fields.mother_number.as_ref().map(CowNumber::as_str),
                    bool_to_int(fields.deleted),
                    id,
                    owner_id,
                ],
            )
            .map_err(|err| classify_write_error(err, COW_TABLE))?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "cow", id });
        }

        Ok(())
    }

    fn get_cow(&self, owner_id: OwnerId, id: CowId) -> RepoResult<Option<Cow>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COW_SELECT_SQL}
             WHERE id = ?1
               AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id, owner_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_cow_row(row)?));
        }

        Ok(None)
    }

    fn cow_owner(&self, id: CowId) -> RepoResult<Option<OwnerId>> {
        let owner = self
            .conn
            .query_row("SELECT owner_id FROM cows WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(owner)
    }

    fn find_cow_id_by_number(&self, owner_id: OwnerId, number: &str) -> RepoResult<Option<CowId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM cows WHERE owner_id = ?1 AND number = ?2;",
                params![owner_id, number],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn list_cows(
        &self,
        owner_id: OwnerId,
        plan: &FilterPlan,
    ) -> RepoResult<Vec<(Cow, Option<CowId>)>> {
        let mut sql = format!("{COW_LIST_SQL} WHERE owner_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(owner_id)];
        push_plan_predicates(&mut sql, &mut bind_values, plan);
        push_plan_ordering(&mut sql, plan);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut cows = Vec::new();
        while let Some(row) = rows.next()? {
            cows.push((parse_cow_row(row)?, row.get("mother_id")?));
        }

        Ok(cows)
    }

    fn delete_cow(&self, owner_id: OwnerId, id: CowId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM cows WHERE id = ?1 AND owner_id = ?2;",
            params![id, owner_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "cow", id });
        }

        Ok(())
    }
}

fn parse_cow_row(row: &Row<'_>) -> RepoResult<Cow> {
    let id: CowId = row.get("id")?;

    let number_text: String = row.get("number")?;
    let number = CowNumber::parse(&number_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid number in cows.number for cow {id}"))
    })?;

    let sex_text: String = row.get("sex")?;
    let sex = Sex::parse(&sex_text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid sex `{sex_text}` in cows.sex")))?;

    let mother_number = match row.get::<_, Option<String>>("mother_number")? {
        Some(value) => Some(CowNumber::parse(&value).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid number in cows.mother_number for cow {id}"
            ))
        })?),
        None => None,
    };

    Ok(Cow {
        id,
        owner_id: row.get("owner_id")?,
        number,
        sex,
        birthday: row.get("birthday")?,
        mother_number,
        deleted: int_to_bool(row.get("is_deleted")?, "cows.is_deleted")?,
        created_at: row.get("created_at")?,
    })
}
