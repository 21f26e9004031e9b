//! Record use-case service.
//!
//! # Responsibility
//! - Provide record create/get/list/delete APIs for user, role, and group
//!   identities.
//! - Apply attribute writes through the projection engine and persist the
//!   resulting rows atomically.
//! - Resolve lookup keys of the form `<kind>://<id>`.
//!
//! # Invariants
//! - Creation timestamps come from the injected clock, never from ambient
//!   wall-clock calls.
//! - Every mutation returns the record as read back from storage.
//! - Record list is always sorted by `created_at DESC, id ASC`.

use crate::model::attribute::{Attribute, AttributeError, AttributeValue};
use crate::model::record::{
    parse_record_key, IdentityRecord, RecordKeyError, RecordKind, RecordValidationError,
};
use crate::repo::record_repo::{
    normalize_record_limit, RecordListQuery, RecordRepository, RepoError, RepoResult,
};
use crate::time::{Clock, SystemClock};
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Service error for record use-cases.
#[derive(Debug)]
pub enum RecordServiceError {
    /// Attribute input is rejected before any write happens.
    InvalidAttribute(AttributeError),
    /// Lookup key does not resolve to a kind and id.
    InvalidKey(RecordKeyError),
    /// Record envelope violates its invariants.
    Validation(RecordValidationError),
    /// Target record does not exist.
    RecordNotFound(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for RecordServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAttribute(err) => write!(f, "invalid attribute: {err}"),
            Self::InvalidKey(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::RecordNotFound(id) => write!(f, "record not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent record state: {details}"),
        }
    }
}

impl Error for RecordServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAttribute(err) => Some(err),
            Self::InvalidKey(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RecordServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::RecordNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<AttributeError> for RecordServiceError {
    fn from(value: AttributeError) -> Self {
        Self::InvalidAttribute(value)
    }
}

impl From<RecordValidationError> for RecordServiceError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RecordKeyError> for RecordServiceError {
    fn from(value: RecordKeyError) -> Self {
        Self::InvalidKey(value)
    }
}

/// List result envelope used by service callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsListResult {
    /// List items sorted by `created_at DESC, id ASC`.
    pub items: Vec<IdentityRecord>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Record service facade over repository implementations.
pub struct RecordService<R: RecordRepository, C: Clock> {
    repo: R,
    clock: C,
}

impl<R: RecordRepository> RecordService<R, SystemClock> {
    /// Creates a service using the provided repository and the system clock.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            clock: SystemClock,
        }
    }
}

impl<R: RecordRepository, C: Clock> RecordService<R, C> {
    /// Creates a service with an explicit clock.
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Creates one enabled record with the clock's current time.
    pub fn create_record(
        &mut self,
        kind: RecordKind,
        id: impl Into<String>,
    ) -> Result<IdentityRecord, RecordServiceError> {
        let record = IdentityRecord::new(kind, id, self.clock.now_epoch_ms())?;
        self.repo.create_record(&record)?;
        self.read_back(record.id(), "created record not found in read-back")
    }

    /// Creates one user record.
    pub fn create_user(&mut self, id: impl Into<String>) -> Result<IdentityRecord, RecordServiceError> {
        self.create_record(RecordKind::User, id)
    }

    /// Creates one role record.
    pub fn create_role(&mut self, id: impl Into<String>) -> Result<IdentityRecord, RecordServiceError> {
        self.create_record(RecordKind::Role, id)
    }

    /// Creates one group record.
    pub fn create_group(&mut self, id: impl Into<String>) -> Result<IdentityRecord, RecordServiceError> {
        self.create_record(RecordKind::Group, id)
    }

    /// Gets one record by stable id.
    pub fn get_record(&self, id: &str) -> RepoResult<Option<IdentityRecord>> {
        self.repo.get_record(id)
    }

    /// Resolves a lookup key like `user://alice`.
    ///
    /// A stored record whose kind does not match the key prefix is treated
    /// as absent.
    pub fn find_by_key(&self, key: &str) -> Result<Option<IdentityRecord>, RecordServiceError> {
        let (kind, id) = parse_record_key(key)?;
        let record = self.repo.get_record(&id)?;
        Ok(record.filter(|record| record.kind() == kind))
    }

    /// Lists records using optional kind filter and pagination.
    pub fn list_records(
        &self,
        kind: Option<RecordKind>,
        include_disabled: bool,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<RecordsListResult, RecordServiceError> {
        let applied_limit = normalize_record_limit(limit);
        let query = RecordListQuery {
            kind,
            include_disabled,
            limit: Some(applied_limit),
            offset,
        };
        let items = self.repo.list_records(&query)?;
        Ok(RecordsListResult {
            items,
            applied_limit,
        })
    }

    /// Assigns an attribute and persists the resulting rows atomically.
    ///
    /// The write is authoritative: previous values for the name are gone
    /// afterwards, in memory and in storage.
    pub fn set_attribute(
        &mut self,
        id: &str,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<IdentityRecord, RecordServiceError> {
        let mut record = self.require_record(id)?;
        record.set_attribute(name, value)?;
        self.repo.replace_attribute_rows(id, record.attribute_rows())?;
        self.read_back(id, "record missing after attribute write")
    }

    /// Removes an attribute and persists the remaining rows atomically.
    pub fn remove_attribute(
        &mut self,
        id: &str,
        name: &str,
    ) -> Result<IdentityRecord, RecordServiceError> {
        let mut record = self.require_record(id)?;
        record.remove_attribute(name);
        self.repo.replace_attribute_rows(id, record.attribute_rows())?;
        self.read_back(id, "record missing after attribute removal")
    }

    /// Looks up one attribute of a record.
    pub fn attribute(&self, id: &str, name: &str) -> Result<Option<Attribute>, RecordServiceError> {
        let mut record = self.require_record(id)?;
        Ok(record.attribute(name))
    }

    /// All attributes of a record in first-seen name order.
    pub fn attributes(&self, id: &str) -> Result<Vec<Attribute>, RecordServiceError> {
        let mut record = self.require_record(id)?;
        Ok(record.attributes())
    }

    /// Enables or disables a record without touching its attributes.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<IdentityRecord, RecordServiceError> {
        let mut record = self.require_record(id)?;
        record.enabled = enabled;
        self.repo.update_record(&record)?;
        self.read_back(id, "record missing after enabled update")
    }

    /// Sets or clears the expiration timestamp of a record.
    pub fn set_expiration(
        &self,
        id: &str,
        expires_at: Option<i64>,
    ) -> Result<IdentityRecord, RecordServiceError> {
        let mut record = self.require_record(id)?;
        record.expires_at = expires_at;
        self.repo.update_record(&record)?;
        self.read_back(id, "record missing after expiration update")
    }

    /// Hard-deletes a record together with its attribute rows.
    pub fn delete_record(&self, id: &str) -> Result<(), RecordServiceError> {
        self.repo.delete_record(id)?;
        Ok(())
    }

    fn require_record(&self, id: &str) -> Result<IdentityRecord, RecordServiceError> {
        self.repo
            .get_record(id)?
            .ok_or_else(|| RecordServiceError::RecordNotFound(id.to_string()))
    }

    fn read_back(
        &self,
        id: &str,
        context: &'static str,
    ) -> Result<IdentityRecord, RecordServiceError> {
        self.repo
            .get_record(id)?
            .ok_or(RecordServiceError::InconsistentState(context))
    }
}
