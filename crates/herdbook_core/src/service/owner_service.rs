//! Owner registration service.
//!
//! # Responsibility
//! - Register owners with validated, unique usernames.
//! - Run post-creation hooks explicitly, in registration order.
//!
//! # Invariants
//! - Hooks run only after the owner row is committed.
//! - Hooks are owned by the service instance; there is no process-wide
//!   listener registry.

use super::{ServiceError, ServiceResult};
use crate::model::owner::{validate_username, Owner};
use crate::model::validation::{FieldErrorKind, FieldErrors};
use crate::model::OwnerId;
use crate::repo::owner_repo::OwnerRepository;
use crate::repo::RepoError;
use log::{info, warn};

/// Side effect run once for every newly registered owner.
pub trait OwnerCreatedHook {
    /// Short stable name used in log events.
    fn name(&self) -> &'static str;
    fn on_owner_created(&self, owner: &Owner);
}

/// Hook that records each registration in the log.
pub struct LogOwnerCreated;

impl OwnerCreatedHook for LogOwnerCreated {
    fn name(&self) -> &'static str {
        "log_owner_created"
    }

    fn on_owner_created(&self, owner: &Owner) {
        info!(
            "event=owner_created module=service status=ok owner_id={}",
            owner.id
        );
    }
}

/// Owner service facade over an owner repository.
pub struct OwnerService<R: OwnerRepository> {
    repo: R,
    hooks: Vec<Box<dyn OwnerCreatedHook>>,
}

impl<R: OwnerRepository> OwnerService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            hooks: Vec::new(),
        }
    }

    /// Appends a post-creation hook.
    pub fn with_hook(mut self, hook: impl OwnerCreatedHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Registers a new owner and runs every hook.
    pub fn register_owner(&self, username: &str) -> ServiceResult<Owner> {
        let username = validate_username(username).map_err(|kind| {
            warn!("event=owner_register module=service status=rejected fields=username");
            ServiceError::Validation(FieldErrors::single("username", kind))
        })?;

        let id = self.repo.create_owner(&username).map_err(|err| match err {
            RepoError::UniqueViolation { .. } => {
                warn!("event=owner_register module=service status=rejected fields=username");
                ServiceError::Validation(FieldErrors::single(
                    "username",
                    FieldErrorKind::DuplicateUsername,
                ))
            }
            other => other.into(),
        })?;

        let owner = self
            .repo
            .get_owner(id)?
            .ok_or(ServiceError::InconsistentState(
                "registered owner not found in read-back",
            ))?;

        for hook in &self.hooks {
            hook.on_owner_created(&owner);
            info!(
                "event=owner_hook module=service status=ok hook={} owner_id={}",
                hook.name(),
                owner.id
            );
        }

        Ok(owner)
    }

    pub fn get_owner(&self, id: OwnerId) -> ServiceResult<Owner> {
        self.repo
            .get_owner(id)?
            .ok_or(ServiceError::NotFound { entity: "owner", id })
    }
}
