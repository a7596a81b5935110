//! Owner repository contracts and SQLite implementation.

use super::{classify_write_error, ensure_connection_ready, RepoResult};
use crate::model::owner::Owner;
use crate::model::OwnerId;
use rusqlite::{Connection, OptionalExtension};

const OWNER_TABLE: &str = "owners";

/// Repository interface for owner registration and lookup.
pub trait OwnerRepository {
    /// Inserts an owner; a taken username yields `UniqueViolation`.
    fn create_owner(&self, username: &str) -> RepoResult<OwnerId>;
    fn get_owner(&self, id: OwnerId) -> RepoResult<Option<Owner>>;
}

/// SQLite-backed owner repository.
pub struct SqliteOwnerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOwnerRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, OWNER_TABLE, &["id", "username", "created_at"])?;
        Ok(Self { conn })
    }
}

impl OwnerRepository for SqliteOwnerRepository<'_> {
    fn create_owner(&self, username: &str) -> RepoResult<OwnerId> {
        self.conn
            .execute("INSERT INTO owners (username) VALUES (?1);", [username])
            .map_err(|err| classify_write_error(err, OWNER_TABLE))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_owner(&self, id: OwnerId) -> RepoResult<Option<Owner>> {
        let owner = self
            .conn
            .query_row(
                "SELECT id, username, created_at FROM owners WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Owner {
                        id: row.get("id")?,
                        username: row.get("username")?,
                        created_at: row.get("created_at")?,
                    })
                },
            )
            .optional()?;
        Ok(owner)
    }
}
