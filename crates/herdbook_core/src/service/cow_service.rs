//! Cow use-case service.
//!
//! # Responsibility
//! - Validate cow input and persist it inside the acting owner's herd.
//! - Resolve mother lineage into `mother_id` for every projection.
//! - Expose list filtering through the query-parameter resolver.
//!
//! # Invariants
//! - Validation completes before any write; failures write nothing.
//! - A duplicate number surfaces as a `number` field error, never as a raw
//!   storage failure.
//! - Lineage lookups never create cows and never fail on "not found".

use super::{ServiceError, ServiceResult};
use crate::filter::{resolve, FilterPlan, COW_SCHEMA, RECORD_SCHEMA};
use crate::model::cow::{Cow, CowFields, CowInput};
use crate::model::validation::{FieldErrorKind, FieldErrors};
use crate::model::view::{CowDetailView, CowView};
use crate::model::{CowId, OwnerId};
use crate::repo::cow_repo::CowRepository;
use crate::repo::record_repo::{RecordRepository, RecordScope};
use crate::repo::RepoError;
use log::{info, warn};

/// Cow service facade over cow and record repositories.
pub struct CowService<C: CowRepository, R: RecordRepository> {
    cows: C,
    records: R,
}

impl<C: CowRepository, R: RecordRepository> CowService<C, R> {
    pub fn new(cows: C, records: R) -> Self {
        Self { cows, records }
    }

    /// Creates a cow for `owner_id`.
    pub fn create_cow(&self, owner_id: OwnerId, input: &CowInput) -> ServiceResult<CowView> {
        let fields = input.validate().map_err(|errors| rejected("cow_create", errors))?;
        let id = self
            .cows
            .create_cow(owner_id, &fields)
            .map_err(translate_write_error)?;
        info!("event=cow_create module=service status=ok cow_id={id}");

        let cow = self.read_back(owner_id, id, "created cow not found in read-back")?;
        self.project(&cow)
    }

    /// Full update (PUT semantics): `number` and `sex` must be supplied,
    /// omitted optional fields keep their stored values.
    pub fn update_cow(
        &self,
        owner_id: OwnerId,
        id: CowId,
        input: &CowInput,
    ) -> ServiceResult<CowView> {
        let current = self.require_cow(owner_id, id)?;
        let fields = input
            .validate_replace(&current.fields())
            .map_err(|errors| rejected("cow_update", errors))?;
        self.write_update(owner_id, id, &fields)
    }

    /// Updates only the supplied fields (PATCH semantics).
    pub fn patch_cow(
        &self,
        owner_id: OwnerId,
        id: CowId,
        patch: &CowInput,
    ) -> ServiceResult<CowView> {
        let current = self.require_cow(owner_id, id)?;
        let fields = patch
            .validate_patch(&current.fields())
            .map_err(|errors| rejected("cow_patch", errors))?;
        self.write_update(owner_id, id, &fields)
    }

    /// Gets one cow with its records nested.
    pub fn get_cow(&self, owner_id: OwnerId, id: CowId) -> ServiceResult<CowDetailView> {
        let cow = self.require_cow(owner_id, id)?;
        let records = self.records.list_records(
            RecordScope::Cow(cow.id),
            &FilterPlan::unfiltered(&RECORD_SCHEMA),
        )?;
        Ok(CowDetailView::with_records(self.project(&cow)?, &records))
    }

    /// Lists the owner's cows, applying whatever query parameters resolve.
    pub fn list_cows<I, K, V>(&self, owner_id: OwnerId, params: I) -> ServiceResult<Vec<CowView>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let plan = resolve(&COW_SCHEMA, params);
        let cows = self.cows.list_cows(owner_id, &plan)?;
        Ok(cows
            .iter()
            .map(|(cow, mother_id)| CowView::project(cow, *mother_id))
            .collect())
    }

    /// Hard-deletes a cow; its records go with it.
    pub fn delete_cow(&self, owner_id: OwnerId, id: CowId) -> ServiceResult<()> {
        self.cows.delete_cow(owner_id, id)?;
        info!("event=cow_delete module=service status=ok cow_id={id}");
        Ok(())
    }

    /// Resolves a cow's mother number to a cow id in the same herd.
    pub fn resolve_mother(&self, cow: &Cow) -> ServiceResult<Option<CowId>> {
        match cow.mother_number.as_ref() {
            Some(number) => Ok(self
                .cows
                .find_cow_id_by_number(cow.owner_id, number.as_str())?),
            None => Ok(None),
        }
    }

    fn write_update(
        &self,
        owner_id: OwnerId,
        id: CowId,
        fields: &CowFields,
    ) -> ServiceResult<CowView> {
        self.cows
            .update_cow(owner_id, id, fields)
            .map_err(translate_write_error)?;
        info!("event=cow_update module=service status=ok cow_id={id}");

        let cow = self.read_back(owner_id, id, "updated cow not found in read-back")?;
        self.project(&cow)
    }

    fn require_cow(&self, owner_id: OwnerId, id: CowId) -> ServiceResult<Cow> {
        self.cows
            .get_cow(owner_id, id)?
            .ok_or(ServiceError::NotFound { entity: "cow", id })
    }

    fn read_back(&self, owner_id: OwnerId, id: CowId, details: &'static str) -> ServiceResult<Cow> {
        self.cows
            .get_cow(owner_id, id)?
            .ok_or(ServiceError::InconsistentState(details))
    }

    fn project(&self, cow: &Cow) -> ServiceResult<CowView> {
        let mother_id = self.resolve_mother(cow)?;
        Ok(CowView::project(cow, mother_id))
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

fn translate_write_error(err: RepoError) -> ServiceError {
    match err {
        RepoError::UniqueViolation { .. } => rejected(
            "cow_write",
            FieldErrors::single("number", FieldErrorKind::DuplicateNumber),
        ),
        other => other.into(),
    }
}
