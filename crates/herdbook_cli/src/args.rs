//! Command-line arguments and environment configuration.

use clap::{Args, Parser, Subcommand};
use herdbook_core::{CowInput, RecordInput};
use std::path::PathBuf;

/// Herdbook - cattle ownership and husbandry records
#[derive(Parser, Debug)]
#[command(name = "herdbook", version)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "HERDBOOK_DB", default_value = "herdbook.sqlite3")]
    pub db: PathBuf,

    /// Acting owner id; required by cow and record commands
    #[arg(long, env = "HERDBOOK_OWNER")]
    pub owner: Option<i64>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "HERDBOOK_LOG_LEVEL", default_value_t = herdbook_core::default_log_level().to_string())]
    pub log_level: String,

    /// Directory for rolling log files; logging is off when unset
    #[arg(long, env = "HERDBOOK_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check core linkage
    Ping,
    /// Owner registration
    Owner {
        #[command(subcommand)]
        action: OwnerAction,
    },
    /// Cows of the acting owner
    Cow {
        #[command(subcommand)]
        action: CowAction,
    },
    /// Records of the acting owner
    Record {
        #[command(subcommand)]
        action: RecordAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum OwnerAction {
    /// Register a new owner
    Add { username: String },
    /// Show one owner
    Show { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum CowAction {
    /// List cows; `-q key=value` parameters filter and order the list
    List {
        #[arg(short = 'q', long = "query", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Create a cow
    Add(CowFieldArgs),
    /// Show one cow with its records
    Show { id: i64 },
    /// Update a cow; number and sex are required, omitted optional fields are kept
    Replace {
        id: i64,
        #[command(flatten)]
        fields: CowFieldArgs,
    },
    /// Update only the given fields of a cow
    Update {
        id: i64,
        #[command(flatten)]
        fields: CowFieldArgs,
    },
    /// Delete a cow and its records
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum RecordAction {
    /// List records; `--cow` restricts to one cow
    List {
        #[arg(long)]
        cow: Option<i64>,
        #[arg(short = 'q', long = "query", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Create a record
    Add(RecordFieldArgs),
    /// Show one record
    Show { id: i64 },
    /// Update a record; cow, content and day are required, omitted etc is kept
    Replace {
        id: i64,
        #[command(flatten)]
        fields: RecordFieldArgs,
    },
    /// Update only the given fields of a record
    Update {
        id: i64,
        #[command(flatten)]
        fields: RecordFieldArgs,
    },
    /// Delete a record
    Delete { id: i64 },
}

#[derive(Args, Debug, Clone, Default)]
pub struct CowFieldArgs {
    /// Cow number, DDD-DDDD-DDDD-D
    #[arg(long)]
    pub number: Option<String>,
    /// female | male
    #[arg(long)]
    pub sex: Option<String>,
    /// YYYY-MM-DD; empty clears it
    #[arg(long)]
    pub birthday: Option<String>,
    /// Mother's cow number; empty clears it
    #[arg(long)]
    pub mother_number: Option<String>,
    /// Soft-delete flag
    #[arg(long)]
    pub deleted: Option<bool>,
}

impl From<CowFieldArgs> for CowInput {
    fn from(args: CowFieldArgs) -> Self {
        Self {
            number: args.number,
            sex: args.sex,
            birthday: args.birthday,
            mother_number: args.mother_number,
            deleted: args.deleted,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RecordFieldArgs {
    /// Cow id the record belongs to
    #[arg(long)]
    pub cow: Option<i64>,
    #[arg(long)]
    pub content: Option<String>,
    /// Extra notes; empty clears them
    #[arg(long)]
    pub etc: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub day: Option<String>,
}

impl From<RecordFieldArgs> for RecordInput {
    fn from(args: RecordFieldArgs) -> Self {
        Self {
            cow: args.cow,
            content: args.content,
            etc: args.etc,
            day: args.day,
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_key_value, Cli, Command, CowAction};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn key_value_keeps_empty_values() {
        assert_eq!(
            parse_key_value("order_by=").unwrap(),
            ("order_by".to_string(), String::new())
        );
        assert_eq!(
            parse_key_value("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_key_value("=x").is_err());
        assert!(parse_key_value("deleted").is_err());
    }

    #[test]
    fn cow_list_collects_query_parameters() {
        let cli = Cli::try_parse_from([
            "herdbook",
            "--owner",
            "1",
            "cow",
            "list",
            "-q",
            "deleted=True",
            "-q",
            "order_by=-birthday",
        ])
        .unwrap();
        match cli.command {
            Command::Cow {
                action: CowAction::List { params },
            } => assert_eq!(
                params,
                vec![
                    ("deleted".to_string(), "True".to_string()),
                    ("order_by".to_string(), "-birthday".to_string()),
                ]
            ),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
