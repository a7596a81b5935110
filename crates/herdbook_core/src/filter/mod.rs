//! Query-parameter driven filtering and ordering for list endpoints.
//!
//! # Responsibility
//! - Describe filterable fields per collection (`schema`).
//! - Turn an arbitrary parameter bag into a `FilterPlan` (`resolver`).
//!
//! # Invariants
//! - Resolution never fails; unusable parameters are dropped.
//! - Plans only reference columns declared in a schema, so rendering them
//!   into SQL never interpolates caller text.

pub mod resolver;
pub mod schema;

pub use resolver::{resolve, Condition, FilterPlan, FilterValue, Ordering, Predicate, ORDER_BY_KEY};
pub use schema::{FieldSpec, FieldType, Lookup, Schema, COW_SCHEMA, RECORD_SCHEMA};
