//! Herd book schema steps.
//!
//! Each step is a named SQL script; `PRAGMA user_version` holds the last
//! applied step. Pending steps run in one transaction, so a failing step
//! leaves the file at its previous version.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "owners_cows_records",
    sql: include_str!("0001_init.sql"),
}];

/// Schema version a fresh herd book ends up at.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |step| step.version)
}

/// Brings `conn` up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    run_steps(conn, MIGRATIONS)
}

/// Reads the applied schema version from `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn run_steps(conn: &mut Connection, steps: &[Migration]) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let known = steps.last().map_or(0, |step| step.version);
    if from > known {
        return Err(DbError::SchemaAhead { found: from, known });
    }

    let pending: Vec<&Migration> = steps.iter().filter(|step| step.version > from).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        let script = format!("{}\nPRAGMA user_version = {};", step.sql, step.version);
        tx.execute_batch(&script)
            .map_err(|source| DbError::Migration {
                version: step.version,
                name: step.name,
                source,
            })?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        from,
        known,
        pending.len()
    );
    Ok(())
}
