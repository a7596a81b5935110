//! Husbandry record model.
//!
//! # Invariants
//! - `content` is never blank.
//! - The referenced cow's owner equals the record owner; checked by the
//!   record service before persistence, not by storage.

use super::validation::{FieldErrorKind, FieldErrors};
use super::{parse_date, CowId, OwnerId, RecordId};
use chrono::NaiveDate;
use serde::Deserialize;

/// Persistable record attributes, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub cow_id: CowId,
    pub content: String,
    pub etc: Option<String>,
    pub day: NaiveDate,
}

/// Stored record row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub cow_id: CowId,
    pub content: String,
    pub etc: Option<String>,
    pub day: NaiveDate,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Record {
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            cow_id: self.cow_id,
            content: self.content.clone(),
            etc: self.etc.clone(),
            day: self.day,
        }
    }
}

/// Raw record input as received from a caller.
///
/// `None` means "not supplied"; an empty `etc` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecordInput {
    pub cow: Option<CowId>,
    pub content: Option<String>,
    pub etc: Option<String>,
    pub day: Option<String>,
}

impl RecordInput {
    /// Validates input for create semantics.
    pub fn validate(&self) -> Result<RecordFields, FieldErrors> {
        self.validate_onto(None, None)
    }

    /// Validates input for full-update semantics: `cow`, `content` and `day`
    /// are required, an omitted `etc` keeps its current value.
    pub fn validate_replace(&self, current: &RecordFields) -> Result<RecordFields, FieldErrors> {
        self.validate_onto(None, Some(current))
    }

    /// Validates input for partial-update semantics over `current`.
    pub fn validate_patch(&self, current: &RecordFields) -> Result<RecordFields, FieldErrors> {
        self.validate_onto(Some(current), Some(current))
    }

    fn validate_onto(
        &self,
        required_from: Option<&RecordFields>,
        current: Option<&RecordFields>,
    ) -> Result<RecordFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let cow_id = self.cow.or(required_from.map(|current| current.cow_id));
        if cow_id.is_none() {
            errors.push("cow", FieldErrorKind::Required);
        }

        let content = match (self.content.as_deref(), required_from) {
            (Some(raw), _) if raw.trim().is_empty() => {
                errors.push("content", FieldErrorKind::Blank);
                None
            }
            (Some(raw), _) => Some(raw.to_string()),
            (None, Some(current)) => Some(current.content.clone()),
            (None, None) => {
                errors.push("content", FieldErrorKind::Required);
                None
            }
        };

        let etc = match (self.etc.as_deref(), current) {
            (Some(raw), _) if raw.trim().is_empty() => None,
            (Some(raw), _) => Some(raw.to_string()),
            (None, Some(current)) => current.etc.clone(),
            (None, None) => None,
        };

        let day = match (self.day.as_deref(), required_from) {
            (Some(raw), _) => match parse_date(raw.trim()) {
                Ok(day) => Some(day),
                Err(kind) => {
                    errors.push("day", kind);
                    None
                }
            },
            (None, Some(current)) => Some(current.day),
            (None, None) => {
                errors.push("day", FieldErrorKind::Required);
                None
            }
        };

        match (cow_id, content, day) {
            (Some(cow_id), Some(content), Some(day)) if errors.is_empty() => Ok(RecordFields {
                cow_id,
                content,
                etc,
                day,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldErrorKind, RecordInput};
    use chrono::NaiveDate;

    #[test]
    fn create_requires_cow_content_and_day() {
        let errors = RecordInput::default().validate().unwrap_err();
        assert_eq!(errors.fields(), vec!["cow", "content", "day"]);
    }

    #[test]
    fn blank_content_and_bad_day_are_rejected() {
        let input = RecordInput {
            cow: Some(1),
            content: Some("  ".to_string()),
            etc: None,
            day: Some("03/04/2021".to_string()),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get("content"), Some(&FieldErrorKind::Blank));
        assert!(matches!(
            errors.get("day"),
            Some(FieldErrorKind::InvalidDate(_))
        ));
    }

    #[test]
    fn replace_requires_core_fields_and_keeps_etc() {
        let current = RecordInput {
            cow: Some(7),
            content: Some("vaccinated".to_string()),
            etc: Some("batch 12".to_string()),
            day: Some("2021-05-01".to_string()),
        }
        .validate()
        .unwrap();

        let errors = RecordInput {
            etc: Some("batch 13".to_string()),
            ..RecordInput::default()
        }
        .validate_replace(&current)
        .unwrap_err();
        assert_eq!(errors.fields(), vec!["cow", "content", "day"]);

        let replaced = RecordInput {
            cow: Some(8),
            content: Some("dewormed".to_string()),
            etc: None,
            day: Some("2021-06-01".to_string()),
        }
        .validate_replace(&current)
        .unwrap();
        assert_eq!(replaced.cow_id, 8);
        assert_eq!(replaced.content, "dewormed");
        assert_eq!(replaced.etc.as_deref(), Some("batch 12"));
    }

    #[test]
    fn patch_overrides_only_supplied_fields() {
        let current = RecordInput {
            cow: Some(7),
            content: Some("vaccinated".to_string()),
            etc: Some("batch 12".to_string()),
            day: Some("2021-05-01".to_string()),
        }
        .validate()
        .unwrap();

        let patched = RecordInput {
            day: Some("2021-05-03".to_string()),
            etc: Some(String::new()),
            ..RecordInput::default()
        }
        .validate_patch(&current)
        .unwrap();

        assert_eq!(patched.cow_id, 7);
        assert_eq!(patched.content, "vaccinated");
        assert_eq!(patched.etc, None);
        assert_eq!(patched.day, NaiveDate::from_ymd_opt(2021, 5, 3).unwrap());
    }
}
