//! Herdbook command-line front end.
//!
//! # Responsibility
//! - Map the list/create/retrieve/update/delete endpoint shapes onto
//!   subcommands over `herdbook_core` services.
//! - Print projections as pretty JSON; print field errors as a JSON object
//!   on stderr.
//!
//! # Exit codes
//! - `0` success, `1` runtime/storage failure, `2` rejected input,
//!   `3` not found.

mod args;

use args::{Cli, Command, CowAction, OwnerAction, RecordAction};
use clap::Parser;
use herdbook_core::db::open_db;
use herdbook_core::{
    CowService, LogOwnerCreated, OwnerId, OwnerService, RecordService, ServiceError,
    SqliteCowRepository, SqliteOwnerRepository, SqliteRecordRepository,
};
use log::error;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

/// Failure surfaced by one CLI invocation.
#[derive(Debug)]
enum CliError {
    Setup(String),
    Service(ServiceError),
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let absolute = std::env::current_dir()
            .map(|cwd| cwd.join(log_dir))
            .unwrap_or_else(|_| log_dir.clone());
        if let Err(err) = herdbook_core::init_logging(&cli.log_level, &absolute.to_string_lossy())
        {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => report(err),
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let Cli {
        db, owner, command, ..
    } = cli;

    match command {
        Command::Ping => Ok(format!(
            "herdbook_core ping={} version={}",
            herdbook_core::ping(),
            herdbook_core::core_version()
        )),
        Command::Owner { action } => run_owner(&connect(&db)?, action),
        Command::Cow { action } => {
            let conn = connect(&db)?;
            let owner = acting_owner(&conn, owner)?;
            run_cow(&conn, owner, action)
        }
        Command::Record { action } => {
            let conn = connect(&db)?;
            let owner = acting_owner(&conn, owner)?;
            run_record(&conn, owner, action)
        }
    }
}

fn connect(path: &Path) -> Result<Connection, CliError> {
    open_db(path).map_err(|err| CliError::Setup(err.to_string()))
}

fn run_owner(conn: &Connection, action: OwnerAction) -> Result<String, CliError> {
    let service = OwnerService::new(owner_repo(conn)?).with_hook(LogOwnerCreated);
    match action {
        OwnerAction::Add { username } => to_json(&service.register_owner(&username)?),
        OwnerAction::Show { id } => to_json(&service.get_owner(id)?),
    }
}

fn run_cow(conn: &Connection, owner: OwnerId, action: CowAction) -> Result<String, CliError> {
    let service = CowService::new(cow_repo(conn)?, record_repo(conn)?);
    match action {
        CowAction::List { params } => to_json(&service.list_cows(owner, params)?),
        CowAction::Add(fields) => to_json(&service.create_cow(owner, &fields.into())?),
        CowAction::Show { id } => to_json(&service.get_cow(owner, id)?),
        CowAction::Replace { id, fields } => {
            to_json(&service.update_cow(owner, id, &fields.into())?)
        }
        CowAction::Update { id, fields } => to_json(&service.patch_cow(owner, id, &fields.into())?),
        CowAction::Delete { id } => {
            service.delete_cow(owner, id)?;
            Ok(format!("deleted cow {id}"))
        }
    }
}

fn run_record(conn: &Connection, owner: OwnerId, action: RecordAction) -> Result<String, CliError> {
    let service = RecordService::new(record_repo(conn)?, cow_repo(conn)?);
    match action {
        RecordAction::List {
            cow: Some(cow),
            params,
        } => to_json(&service.list_cow_records(owner, cow, params)?),
        RecordAction::List { cow: None, params } => to_json(&service.list_records(owner, params)?),
        RecordAction::Add(fields) => to_json(&service.create_record(owner, &fields.into())?),
        RecordAction::Show { id } => to_json(&service.get_record(owner, id)?),
        RecordAction::Replace { id, fields } => {
            to_json(&service.update_record(owner, id, &fields.into())?)
        }
        RecordAction::Update { id, fields } => {
            to_json(&service.patch_record(owner, id, &fields.into())?)
        }
        RecordAction::Delete { id } => {
            service.delete_record(owner, id)?;
            Ok(format!("deleted record {id}"))
        }
    }
}

/// Resolves `--owner` to a registered owner id.
fn acting_owner(conn: &Connection, owner: Option<OwnerId>) -> Result<OwnerId, CliError> {
    let id = owner.ok_or_else(|| {
        CliError::Setup("an acting owner is required: pass --owner or set HERDBOOK_OWNER".into())
    })?;
    OwnerService::new(owner_repo(conn)?).get_owner(id)?;
    Ok(id)
}

fn owner_repo(conn: &Connection) -> Result<SqliteOwnerRepository<'_>, CliError> {
    SqliteOwnerRepository::try_new(conn).map_err(|err| CliError::Setup(err.to_string()))
}

fn cow_repo(conn: &Connection) -> Result<SqliteCowRepository<'_>, CliError> {
    SqliteCowRepository::try_new(conn).map_err(|err| CliError::Setup(err.to_string()))
}

fn record_repo(conn: &Connection) -> Result<SqliteRecordRepository<'_>, CliError> {
    SqliteRecordRepository::try_new(conn).map_err(|err| CliError::Setup(err.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::Setup(format!("failed to render output: {err}")))
}

fn report(err: CliError) -> ExitCode {
    match err {
        CliError::Service(ServiceError::Validation(errors)) => {
            match serde_json::to_string_pretty(&errors) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{errors}"),
            }
            ExitCode::from(2)
        }
        CliError::Service(err @ ServiceError::NotFound { .. }) => {
            eprintln!("{err}");
            ExitCode::from(3)
        }
        CliError::Service(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
        CliError::Setup(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
