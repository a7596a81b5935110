//! Record use-case service.
//!
//! # Responsibility
//! - Validate record input, including ownership of the referenced cow.
//! - Expose owner-wide and per-cow listings through the filter resolver.
//!
//! # Invariants
//! - A record is only written against a cow owned by the acting owner;
//!   otherwise the `cow` field is rejected.
//! - Per-cow listings check cow ownership once, then scope by cow only.

use super::{ServiceError, ServiceResult};
use crate::filter::{resolve, RECORD_SCHEMA};
use crate::model::record::{Record, RecordFields, RecordInput};
use crate::model::validation::{FieldErrorKind, FieldErrors};
use crate::model::view::RecordView;
use crate::model::{CowId, OwnerId, RecordId};
use crate::repo::cow_repo::CowRepository;
use crate::repo::record_repo::{RecordRepository, RecordScope};
use log::{info, warn};

/// Record service facade over record and cow repositories.
pub struct RecordService<R: RecordRepository, C: CowRepository> {
    records: R,
    cows: C,
}

impl<R: RecordRepository, C: CowRepository> RecordService<R, C> {
    pub fn new(records: R, cows: C) -> Self {
        Self { records, cows }
    }

    /// Creates a record for `owner_id`.
    pub fn create_record(
        &self,
        owner_id: OwnerId,
        input: &RecordInput,
    ) -> ServiceResult<RecordView> {
        let fields = self.validated(owner_id, input.validate(), "record_create")?;
        let id = self.records.create_record(owner_id, &fields)?;
        info!(
            "event=record_create module=service status=ok record_id={} cow_id={}",
            id, fields.cow_id
        );
        self.read_back(owner_id, id, "created record not found in read-back")
    }

    /// Full update (PUT semantics): required fields must be supplied,
    /// omitted optional fields keep their stored values.
    pub fn update_record(
        &self,
        owner_id: OwnerId,
        id: RecordId,
        input: &RecordInput,
    ) -> ServiceResult<RecordView> {
        let current = self.require_record(owner_id, id)?;
        let fields = self.validated(
            owner_id,
            input.validate_replace(&current.fields()),
            "record_update",
        )?;
        self.write_update(owner_id, id, &fields)
    }

    /// Updates only the supplied fields (PATCH semantics).
    pub fn patch_record(
        &self,
        owner_id: OwnerId,
        id: RecordId,
        patch: &RecordInput,
    ) -> ServiceResult<RecordView> {
        let current = self.require_record(owner_id, id)?;
        let fields = self.validated(
            owner_id,
            patch.validate_patch(&current.fields()),
            "record_patch",
        )?;
        self.write_update(owner_id, id, &fields)
    }

    pub fn get_record(&self, owner_id: OwnerId, id: RecordId) -> ServiceResult<RecordView> {
        let record = self.require_record(owner_id, id)?;
        Ok(RecordView::from(&record))
    }

    /// Lists the owner's records, applying whatever query parameters resolve.
    pub fn list_records<I, K, V>(
        &self,
        owner_id: OwnerId,
        params: I,
    ) -> ServiceResult<Vec<RecordView>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let plan = resolve(&RECORD_SCHEMA, params);
        let records = self
            .records
            .list_records(RecordScope::Owner(owner_id), &plan)?;
        Ok(records.iter().map(RecordView::from).collect())
    }

    /// Lists records of one of the owner's cows.
    pub fn list_cow_records<I, K, V>(
        &self,
        owner_id: OwnerId,
        cow_id: CowId,
        params: I,
    ) -> ServiceResult<Vec<RecordView>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if self.cows.cow_owner(cow_id)? != Some(owner_id) {
            return Err(ServiceError::NotFound {
                entity: "cow",
                id: cow_id,
            });
        }

        let plan = resolve(&RECORD_SCHEMA, params);
        let records = self.records.list_records(RecordScope::Cow(cow_id), &plan)?;
        Ok(records.iter().map(RecordView::from).collect())
    }

    pub fn delete_record(&self, owner_id: OwnerId, id: RecordId) -> ServiceResult<()> {
        self.records.delete_record(owner_id, id)?;
        info!("event=record_delete module=service status=ok record_id={id}");
        Ok(())
    }

    /// Completes field validation with the cow ownership check.
    fn validated(
        &self,
        owner_id: OwnerId,
        validated: Result<RecordFields, FieldErrors>,
        event: &str,
    ) -> ServiceResult<RecordFields> {
        let fields = validated.map_err(|errors| rejected(event, errors))?;
        match self.cows.cow_owner(fields.cow_id)? {
            Some(cow_owner) if cow_owner == owner_id => Ok(fields),
            Some(_) => Err(rejected(
                event,
                FieldErrors::single("cow", FieldErrorKind::NotOwner),
            )),
            None => Err(rejected(
                event,
                FieldErrors::single("cow", FieldErrorKind::DoesNotExist(fields.cow_id)),
            )),
        }
    }

    fn write_update(
        &self,
        owner_id: OwnerId,
        id: RecordId,
        fields: &RecordFields,
    ) -> ServiceResult<RecordView> {
        self.records.update_record(owner_id, id, fields)?;
        info!(
            "event=record_update module=service status=ok record_id={} cow_id={}",
            id, fields.cow_id
        );
        self.read_back(owner_id, id, "updated record not found in read-back")
    }

    fn require_record(&self, owner_id: OwnerId, id: RecordId) -> ServiceResult<Record> {
        self.records
            .get_record(owner_id, id)?
            .ok_or(ServiceError::NotFound {
                entity: "record",
                id,
            })
    }

    fn read_back(
        &self,
        owner_id: OwnerId,
        id: RecordId,
        details: &'static str,
    ) -> ServiceResult<RecordView> {
        self.records
            .get_record(owner_id, id)?
            .map(|record| RecordView::from(&record))
            .ok_or(ServiceError::InconsistentState(details))
    }
}

fn rejected(event: &str, errors: FieldErrors) -> ServiceError {
    warn!(
        "event={} module=service status=rejected fields={}",
        event,
        errors.fields().join(",")
    );
    ServiceError::Validation(errors)
}
