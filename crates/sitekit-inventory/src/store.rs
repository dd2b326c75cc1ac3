//! The inventory store contract consumed by provisioning jobs.
//!
//! Lookups return [`Lookup`] instead of an error on absence: a miss is an
//! ordinary branch for callers, not a fault. `create_*` builds a record with a
//! fresh id; the record becomes visible only after
//! [`InventoryStore::validate_and_persist`] accepts it.

use crate::record::{Entity, Location, LocationType, RecordId, RecordKind, Status};

/// Result of a lookup by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(found) => Lookup::Found(found),
            None => Lookup::NotFound,
        }
    }
}

/// Rejections raised by store-side validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{kind} name must not be blank")]
    BlankName { kind: RecordKind },

    #[error("{kind} name `{name}` exceeds {max} characters")]
    NameTooLong {
        kind: RecordKind,
        name: String,
        max: usize,
    },

    #[error("{kind} with name `{name}` already exists")]
    DuplicateName { kind: RecordKind, name: String },

    #[error("{kind} `{name}` was already persisted")]
    AlreadyPersisted { kind: RecordKind, name: String },

    #[error("`{name}` references missing {target} {id}")]
    DanglingReference {
        name: String,
        target: RecordKind,
        id: RecordId,
    },

    #[error("location `{name}` of type `{location_type}` requires a parent of type `{parent_type}`")]
    ParentRequired {
        name: String,
        location_type: String,
        parent_type: String,
    },

    #[error(
        "location `{name}` of type `{location_type}` may not have a parent of type `{actual}` (expected {expected})"
    )]
    ParentTypeMismatch {
        name: String,
        location_type: String,
        expected: String,
        actual: String,
    },
}

/// Errors surfaced by an [`InventoryStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// CRUD capability over statuses, location types and locations.
pub trait InventoryStore {
    fn find_location_type(&self, name: &str) -> Result<Lookup<LocationType>, StoreError>;

    fn create_location_type(
        &mut self,
        name: &str,
        parent: Option<&LocationType>,
    ) -> Result<LocationType, StoreError>;

    fn find_location(&self, name: &str) -> Result<Lookup<Location>, StoreError>;

    fn create_location(
        &mut self,
        name: &str,
        location_type: &LocationType,
        status: &Status,
        parent: Option<&Location>,
    ) -> Result<Location, StoreError>;

    fn find_status(&self, name: &str) -> Result<Lookup<Status>, StoreError>;

    /// Run store-side validation and commit the entity.
    fn validate_and_persist(&mut self, entity: Entity) -> Result<(), StoreError>;
}
