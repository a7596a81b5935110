//! Best-effort resolution of query parameters into a filter plan.
//!
//! # Responsibility
//! - Accept every parameter that names a schema field with a coercible value.
//! - Accept at most one `order_by` field, `-` prefix meaning descending.
//!
//! # Invariants
//! - Unknown fields, unknown lookups and uncoercible values are dropped,
//!   never reported.
//! - `order_by` is probed with an `isnull` lookup; an empty value is skipped
//!   without a probe.
//! - When a key repeats, only its last value is considered.

use super::schema::{FieldSpec, FieldType, Lookup, Schema};
use crate::model::parse_date;
use chrono::NaiveDate;
use log::debug;

/// Reserved parameter selecting the ordering field.
pub const ORDER_BY_KEY: &str = "order_by";

const LOOKUP_SEPARATOR: &str = "__";
const DESCENDING_PREFIX: char = '-';

/// Typed comparison value produced by coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
}

/// Comparison applied to one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(FilterValue),
    /// `true` selects NULL columns, `false` selects non-NULL ones.
    IsNull(bool),
}

/// Accepted predicate; all predicates of a plan are AND-ed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: &'static FieldSpec,
    pub condition: Condition,
}

/// Accepted ordering request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub field: &'static FieldSpec,
    pub descending: bool,
}

/// Outcome of resolving a parameter bag against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPlan {
    pub schema: &'static Schema,
    pub predicates: Vec<Predicate>,
    /// `None` keeps the schema's default order.
    pub ordering: Option<Ordering>,
}

impl FilterPlan {
    /// Plan that applies nothing: every row, default order.
    pub fn unfiltered(schema: &'static Schema) -> Self {
        Self {
            schema,
            predicates: Vec::new(),
            ordering: None,
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty() && self.ordering.is_none()
    }

    /// Names of the accepted filter fields, in parameter order.
    pub fn filtered_fields(&self) -> Vec<&'static str> {
        self.predicates
            .iter()
            .map(|predicate| predicate.field.name)
            .collect()
    }
}

/// Resolves query parameters into a plan over `schema`.
///
/// Never fails: the worst case is `FilterPlan::unfiltered`.
pub fn resolve<I, K, V>(schema: &'static Schema, params: I) -> FilterPlan
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let params = collapse_last_wins(params);
    let mut plan = FilterPlan::unfiltered(schema);
    let mut ignored = 0usize;

    for (key, value) in &params {
        if key == ORDER_BY_KEY {
            if value.is_empty() {
                continue;
            }
            match resolve_ordering(schema, value) {
                Some(ordering) => plan.ordering = Some(ordering),
                None => ignored += 1,
            }
            continue;
        }

        match resolve_predicate(schema, key, value) {
            Some(predicate) => plan.predicates.push(predicate),
            None => ignored += 1,
        }
    }

    debug!(
        "event=filter_resolve module=filter status=ok schema={} accepted={} ignored={} ordered={}",
        schema.name,
        plan.predicates.len(),
        ignored,
        plan.ordering.is_some()
    );
    plan
}

fn collapse_last_wins<I, K, V>(params: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut collapsed: Vec<(String, String)> = Vec::new();
    for (key, value) in params {
        let (key, value) = (key.as_ref(), value.as_ref());
        match collapsed.iter_mut().find(|(existing, _)| existing == key) {
            Some(slot) => slot.1 = value.to_string(),
            None => collapsed.push((key.to_string(), value.to_string())),
        }
    }
    collapsed
}

fn resolve_predicate(schema: &'static Schema, key: &str, value: &str) -> Option<Predicate> {
    let (name, lookup) = split_lookup(key)?;
    if !schema.supports(name, lookup) {
        return None;
    }
    let field = schema.field(name)?;

    let condition = match lookup {
        Lookup::Exact => Condition::Equals(coerce(field.kind, value)?),
        Lookup::IsNull => Condition::IsNull(parse_bool(value)?),
    };
    Some(Predicate { field, condition })
}

fn resolve_ordering(schema: &'static Schema, value: &str) -> Option<Ordering> {
    let (name, descending) = match value.strip_prefix(DESCENDING_PREFIX) {
        Some(stripped) => (stripped, true),
        None => (value, false),
    };

    // Probe: the field must accept `isnull`, same as a filter would.
    resolve_predicate(schema, &format!("{name}{LOOKUP_SEPARATOR}isnull"), "True")?;
    let field = schema.field(name)?;
    Some(Ordering { field, descending })
}

fn split_lookup(key: &str) -> Option<(&str, Lookup)> {
    match key.split_once(LOOKUP_SEPARATOR) {
        Some((name, lookup)) => Some((name, Lookup::parse(lookup)?)),
        None => Some((key, Lookup::Exact)),
    }
}

fn coerce(kind: FieldType, raw: &str) -> Option<FilterValue> {
    match kind {
        FieldType::Integer => raw.trim().parse::<i64>().ok().map(FilterValue::Integer),
        FieldType::Text => Some(FilterValue::Text(raw.to_string())),
        FieldType::Boolean => parse_bool(raw).map(FilterValue::Boolean),
        FieldType::Date => parse_date(raw.trim()).ok().map(FilterValue::Date),
        FieldType::Choice(choices) => choices
            .contains(&raw)
            .then(|| FilterValue::Text(raw.to_string())),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "True" | "true" | "t" | "1" => Some(true),
        "False" | "false" | "f" | "0" => Some(false),
        _ => None,
    }
}
