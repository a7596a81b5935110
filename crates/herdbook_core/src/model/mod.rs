//! Domain model for owners, cows and husbandry records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Turn raw caller input into validated, persistable fields.
//! - Provide read projections handed to front ends.
//!
//! # Invariants
//! - Every cow and record belongs to exactly one owner.
//! - Validation never touches storage; cross-entity checks live in services.

pub mod cow;
pub mod owner;
pub mod record;
pub mod validation;
pub mod view;

use chrono::NaiveDate;
use validation::FieldErrorKind;

/// Owner (principal) identifier.
pub type OwnerId = i64;
/// Cow row identifier.
pub type CowId = i64;
/// Record row identifier.
pub type RecordId = i64;

/// External date format for every date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, FieldErrorKind> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| FieldErrorKind::InvalidDate(value.to_string()))
}
