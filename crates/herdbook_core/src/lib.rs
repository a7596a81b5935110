//! Core domain logic for herdbook.
//! This crate is the single source of truth for herd and record invariants.

pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use filter::{resolve, FilterPlan, COW_SCHEMA, ORDER_BY_KEY, RECORD_SCHEMA};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cow::{summarize, validate_cow_number, Cow, CowFields, CowInput, CowNumber, Sex};
pub use model::owner::Owner;
pub use model::record::{Record, RecordFields, RecordInput};
pub use model::validation::{FieldError, FieldErrorKind, FieldErrors};
pub use model::view::{CowDetailView, CowView, RecordView};
pub use model::{CowId, OwnerId, RecordId};
pub use repo::cow_repo::{CowRepository, SqliteCowRepository};
pub use repo::owner_repo::{OwnerRepository, SqliteOwnerRepository};
pub use repo::record_repo::{RecordRepository, RecordScope, SqliteRecordRepository};
pub use repo::{RepoError, RepoResult};
pub use service::cow_service::CowService;
pub use service::owner_service::{LogOwnerCreated, OwnerCreatedHook, OwnerService};
pub use service::record_service::RecordService;
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for front-end wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
