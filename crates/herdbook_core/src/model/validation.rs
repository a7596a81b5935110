//! Field-level validation errors shared by every write path.
//!
//! # Responsibility
//! - Describe why one input field was rejected.
//! - Collect all field failures of one request so callers see them together.
//!
//! # Invariants
//! - A non-empty `FieldErrors` always means nothing was persisted.
//! - Serialized shape is `{"field": ["message", ...]}` in first-seen order.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reason a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Field must be present for this operation.
    Required,
    /// Field is present but empty/whitespace.
    Blank,
    /// Value exceeds the maximum accepted length.
    TooLong { max: usize },
    /// Cow number does not follow `DDD-DDDD-DDDD-D`.
    InvalidNumberPattern,
    /// Value is not one of the accepted choices.
    InvalidChoice(String),
    /// Value is not a `YYYY-MM-DD` calendar date.
    InvalidDate(String),
    /// Username contains characters outside `[\w.@+-]`.
    InvalidUsername,
    /// Referenced id does not exist.
    DoesNotExist(i64),
    /// Referenced entity belongs to another owner.
    NotOwner,
    /// Cow number already used by the same owner.
    DuplicateNumber,
    /// Username already registered.
    DuplicateUsername,
}

impl Display for FieldErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => write!(f, "this field is required"),
            Self::Blank => write!(f, "this field may not be blank"),
            Self::TooLong { max } => write!(f, "ensure this field has no more than {max} characters"),
            Self::InvalidNumberPattern => write!(f, "number pattern is not valid"),
            Self::InvalidChoice(value) => write!(f, "`{value}` is not a valid choice"),
            Self::InvalidDate(value) => {
                write!(f, "date `{value}` has wrong format, use YYYY-MM-DD")
            }
            Self::InvalidUsername => write!(
                f,
                "enter a valid username: letters, numbers and @/./+/-/_ characters only"
            ),
            Self::DoesNotExist(id) => write!(f, "invalid id `{id}`: object does not exist"),
            Self::NotOwner => write!(f, "referenced cow is owned by another owner"),
            Self::DuplicateNumber => write!(f, "a cow with this number already exists"),
            Self::DuplicateUsername => write!(f, "an owner with this username already exists"),
        }
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// External field name (`number`, `cow`, ...).
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

/// All field failures of one write request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection holding exactly one failure.
    pub fn single(field: &'static str, kind: FieldErrorKind) -> Self {
        let mut errors = Self::new();
        errors.push(field, kind);
        errors
    }

    pub fn push(&mut self, field: &'static str, kind: FieldErrorKind) {
        self.errors.push(FieldError { field, kind });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Returns the first failure recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&FieldErrorKind> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| &error.kind)
    }

    /// Distinct field names in first-seen order.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        for error in &self.errors {
            if !fields.contains(&error.field) {
                fields.push(error.field);
            }
        }
        fields
    }

    /// `Ok(())` when nothing was rejected, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, error) in self.errors.iter().enumerate() {
            if idx > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.kind)?;
        }
        Ok(())
    }
}

impl Error for FieldErrors {}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.fields();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for field in fields {
            let messages: Vec<String> = self
                .errors
                .iter()
                .filter(|error| error.field == field)
                .map(|error| error.kind.to_string())
                .collect();
            map.serialize_entry(field, &messages)?;
        }
        map.end()
    }
}
