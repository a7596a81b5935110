//! Static schema descriptors for filterable collections.

use crate::model::cow::SEX_CHOICES;

/// Value type of a filterable field; drives value coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Text,
    Boolean,
    /// `YYYY-MM-DD`.
    Date,
    /// Text restricted to the listed values.
    Choice(&'static [&'static str]),
}

/// Comparison operator named by a `field__lookup` key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Exact,
    IsNull,
}

impl Lookup {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "exact" => Some(Self::Exact),
            "isnull" => Some(Self::IsNull),
            _ => None,
        }
    }
}

/// One filterable/orderable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// External parameter name.
    pub name: &'static str,
    /// Storage column; always a trusted identifier.
    pub column: &'static str,
    pub kind: FieldType,
}

/// Term of a collection's default ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: &'static str,
    pub descending: bool,
}

/// Filterable field set of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
    /// Used when no ordering is requested or the request is discarded.
    pub default_order: &'static [OrderTerm],
    /// Appended after any ordering to keep results deterministic.
    pub tiebreak_column: &'static str,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Whether `field__lookup` is a valid predicate for this schema.
    pub fn supports(&self, name: &str, lookup: Lookup) -> bool {
        match self.field(name) {
            Some(_) => matches!(lookup, Lookup::Exact | Lookup::IsNull),
            None => false,
        }
    }
}

const fn field(name: &'static str, column: &'static str, kind: FieldType) -> FieldSpec {
    FieldSpec { name, column, kind }
}

const fn asc(column: &'static str) -> OrderTerm {
    OrderTerm {
        column,
        descending: false,
    }
}

/// Cows visible to one owner.
pub static COW_SCHEMA: Schema = Schema {
    name: "cows",
    fields: &[
        field("id", "id", FieldType::Integer),
        field("user", "owner_id", FieldType::Integer),
        field("user_id", "owner_id", FieldType::Integer),
        field("number", "number", FieldType::Text),
        field("sex", "sex", FieldType::Choice(SEX_CHOICES)),
        field("birthday", "birthday", FieldType::Date),
        field("mother_number", "mother_number", FieldType::Text),
        field("deleted", "is_deleted", FieldType::Boolean),
        field("created", "created_at", FieldType::Integer),
    ],
    default_order: &[asc("birthday"), asc("created_at")],
    tiebreak_column: "id",
};

/// Records visible to one owner.
pub static RECORD_SCHEMA: Schema = Schema {
    name: "records",
    fields: &[
        field("id", "id", FieldType::Integer),
        field("user", "owner_id", FieldType::Integer),
        field("user_id", "owner_id", FieldType::Integer),
        field("cow", "cow_id", FieldType::Integer),
        field("cow_id", "cow_id", FieldType::Integer),
        field("content", "content", FieldType::Text),
        field("etc", "etc", FieldType::Text),
        field("day", "day", FieldType::Date),
        field("created", "created_at", FieldType::Integer),
    ],
    default_order: &[asc("day"), asc("created_at")],
    tiebreak_column: "id",
};
