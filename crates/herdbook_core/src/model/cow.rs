//! Cow domain model.
//!
//! # Responsibility
//! - Define the cow entity and its structured number identifier.
//! - Validate raw cow input into persistable fields.
//! - Provide the pure `summary` projection.
//!
//! # Invariants
//! - `CowNumber` always matches `DDD-DDDD-DDDD-D` (ASCII digits).
//! - `mother_number` is a weak reference and may match no cow.

use super::validation::{FieldErrorKind, FieldErrors};
use super::{parse_date, CowId, OwnerId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const COW_NUMBER_LEN: usize = 15;
const COW_NUMBER_GROUP_LENS: [usize; 4] = [3, 4, 4, 1];
const SUMMARY_GROUP_INDEX: usize = 2;
const SUMMARY_TAIL_LEN: usize = 3;

/// Biological sex of a cow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
        }
    }

    /// Parses the stored/external choice value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "female" => Some(Self::Female),
            "male" => Some(Self::Male),
            _ => None,
        }
    }

    /// Glyph appended to the summary projection.
    pub fn glyph(self) -> char {
        match self {
            Self::Female => '♀',
            Self::Male => '♂',
        }
    }
}

/// Accepted external choice values for `Sex`.
pub const SEX_CHOICES: &[&str] = &["female", "male"];

/// Checks the structural cow number pattern.
///
/// Exactly 15 characters, four dash-separated groups of lengths 3, 4, 4, 1,
/// every group character an ASCII decimal digit.
pub fn validate_cow_number(value: &str) -> Result<(), FieldErrorKind> {
    if value.chars().count() != COW_NUMBER_LEN {
        return Err(FieldErrorKind::InvalidNumberPattern);
    }

    let groups: Vec<&str> = value.split('-').collect();
    if groups.len() != COW_NUMBER_GROUP_LENS.len() {
        return Err(FieldErrorKind::InvalidNumberPattern);
    }

    let well_formed = groups
        .iter()
        .zip(COW_NUMBER_GROUP_LENS)
        .all(|(group, len)| group.len() == len && group.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return Err(FieldErrorKind::InvalidNumberPattern);
    }

    Ok(())
}

/// Validated cow number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CowNumber(String);

impl CowNumber {
    pub fn parse(value: &str) -> Result<Self, FieldErrorKind> {
        validate_cow_number(value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CowNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders the last three digits of the third number group plus the sex
/// glyph: `002-1023-1203-1` female is `203♀`.
///
/// Returns `None` when `number` has fewer than three dash groups. A third
/// group shorter than three characters is used whole.
pub fn summarize(number: &str, sex: Sex) -> Option<String> {
    let group = number.split('-').nth(SUMMARY_GROUP_INDEX)?;
    let skip = group.chars().count().saturating_sub(SUMMARY_TAIL_LEN);
    let tail: String = group.chars().skip(skip).collect();
    Some(format!("{tail}{}", sex.glyph()))
}

/// Persistable cow attributes, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CowFields {
    pub number: CowNumber,
    pub sex: Sex,
    pub birthday: Option<NaiveDate>,
    pub mother_number: Option<CowNumber>,
    pub deleted: bool,
}

/// Stored cow row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cow {
    pub id: CowId,
    pub owner_id: OwnerId,
    pub number: CowNumber,
    pub sex: Sex,
    pub birthday: Option<NaiveDate>,
    pub mother_number: Option<CowNumber>,
    /// Soft-delete flag; an ordinary attribute, rows are removed by hard delete.
    pub deleted: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Cow {
    pub fn summary(&self) -> String {
        // CowNumber always carries four groups.
        summarize(self.number.as_str(), self.sex).unwrap_or_default()
    }

    pub fn fields(&self) -> CowFields {
        CowFields {
            number: self.number.clone(),
            sex: self.sex,
            birthday: self.birthday,
            mother_number: self.mother_number.clone(),
            deleted: self.deleted,
        }
    }
}

/// Raw cow input as received from a caller.
///
/// `None` means "not supplied". For nullable fields an empty string clears
/// the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CowInput {
    pub number: Option<String>,
    pub sex: Option<String>,
    pub birthday: Option<String>,
    pub mother_number: Option<String>,
    pub deleted: Option<bool>,
}

impl CowInput {
    /// Validates input for create semantics.
    ///
    /// `number` and `sex` are required; omitted optional fields take their
    /// defaults.
    pub fn validate(&self) -> Result<CowFields, FieldErrors> {
        self.validate_onto(None, None)
    }

    /// Validates input for full-update semantics over `current`.
    ///
    /// `number` and `sex` are required as on create; omitted optional fields
    /// keep their current values.
    pub fn validate_replace(&self, current: &CowFields) -> Result<CowFields, FieldErrors> {
        self.validate_onto(None, Some(current))
    }

    /// Validates input for partial-update semantics over `current`.
    pub fn validate_patch(&self, current: &CowFields) -> Result<CowFields, FieldErrors> {
        self.validate_onto(Some(current), Some(current))
    }

    /// `required_from` backs omitted required fields, `current` backs
    /// omitted optional ones.
    fn validate_onto(
        &self,
        required_from: Option<&CowFields>,
        current: Option<&CowFields>,
    ) -> Result<CowFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let number = match (self.number.as_deref(), required_from) {
            (Some(raw), _) => record(&mut errors, "number", CowNumber::parse(raw.trim())),
            (None, Some(current)) => Some(current.number.clone()),
            (None, None) => {
                errors.push("number", FieldErrorKind::Required);
                None
            }
        };

        let sex = match (self.sex.as_deref(), required_from) {
            (Some(raw), _) => record(
                &mut errors,
                "sex",
                Sex::parse(raw.trim()).ok_or_else(|| FieldErrorKind::InvalidChoice(raw.to_string())),
            ),
            (None, Some(current)) => Some(current.sex),
            (None, None) => {
                errors.push("sex", FieldErrorKind::Required);
                None
            }
        };

        let birthday = match (self.birthday.as_deref(), current) {
            (Some(raw), _) => record(&mut errors, "birthday", parse_optional_date(raw)),
            (None, Some(current)) => Some(current.birthday),
            (None, None) => Some(None),
        };

        let mother_number = match (self.mother_number.as_deref(), current) {
            (Some(raw), _) => record(&mut errors, "mother_number", parse_mother_number(raw)),
            (None, Some(current)) => Some(current.mother_number.clone()),
            (None, None) => Some(None),
        };

        let deleted = self
            .deleted
            .or(current.map(|current| current.deleted))
            .unwrap_or(false);

        match (number, sex, birthday, mother_number) {
            (Some(number), Some(sex), Some(birthday), Some(mother_number)) if errors.is_empty() => {
                Ok(CowFields {
                    number,
                    sex,
                    birthday,
                    mother_number,
                    deleted,
                })
            }
            _ => Err(errors),
        }
    }
}

fn record<T>(
    errors: &mut FieldErrors,
    field: &'static str,
    result: Result<T, FieldErrorKind>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(kind) => {
            errors.push(field, kind);
            None
        }
    }
}

fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, FieldErrorKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_date(trimmed).map(Some)
}

fn parse_mother_number(raw: &str) -> Result<Option<CowNumber>, FieldErrorKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    CowNumber::parse(trimmed).map(Some)
}
