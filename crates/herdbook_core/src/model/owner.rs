//! Owner (principal) model.

use super::validation::FieldErrorKind;
use super::OwnerId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const USERNAME_MAX_CHARS: usize = 150;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Registered owner row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub id: OwnerId,
    pub username: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Validates and trims a username.
pub fn validate_username(raw: &str) -> Result<String, FieldErrorKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldErrorKind::Blank);
    }
    if trimmed.chars().count() > USERNAME_MAX_CHARS {
        return Err(FieldErrorKind::TooLong {
            max: USERNAME_MAX_CHARS,
        });
    }
    if !USERNAME_RE.is_match(trimmed) {
        return Err(FieldErrorKind::InvalidUsername);
    }
    Ok(trimmed.to_string())
}
