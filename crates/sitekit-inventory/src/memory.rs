//! Canonical in-memory inventory.
//!
//! `MemoryInventory` owns every record, enforces store-side validation in
//! [`InventoryStore::validate_and_persist`], and round-trips through JSONL.

use crate::jsonl::{JsonlError, canonical_lines, read_entities_from_path, write_entities_to_path};
use crate::record::{Entity, Location, LocationType, RecordId, RecordKind, Status};
use crate::store::{InventoryStore, Lookup, StoreError, ValidationError};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// Widest name the inventory accepts, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Prefix of inventory snapshot digests.
pub const SNAPSHOT_REF_PREFIX: &str = "inv1_";

/// Errors raised while loading or saving the inventory.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error(transparent)]
    Jsonl(#[from] JsonlError),

    #[error("invalid {kind} record `{name}`: {source}")]
    Invalid {
        kind: RecordKind,
        name: String,
        #[source]
        source: ValidationError,
    },
}

/// In-memory state for statuses, location types and locations.
///
/// Records are keyed by name, so iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MemoryInventory {
    statuses: BTreeMap<String, Status>,
    location_types: BTreeMap<String, LocationType>,
    locations: BTreeMap<String, Location>,
    revision: u64,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an inventory from records in any order.
    ///
    /// Parents are admitted before their children regardless of input order.
    /// Every record passes the same validation as a fresh write.
    pub fn from_entities(entities: Vec<Entity>) -> Result<Self, InventoryError> {
        let mut inventory = Self::new();
        let mut pending: Vec<Entity> = entities;
        pending.sort_by_key(Entity::kind);

        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for entity in pending {
                if inventory.parent_present(&entity) {
                    inventory.admit(entity)?;
                } else {
                    deferred.push(entity);
                }
            }
            if deferred.len() == before {
                // No progress: admitting any deferred record surfaces its dangling parent.
                let entity = deferred.remove(0);
                inventory.admit(entity)?;
            }
            pending = deferred;
        }

        inventory.revision = 0;
        Ok(inventory)
    }

    /// Load inventory state from a JSONL file.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self, InventoryError> {
        let entities = read_entities_from_path(path)?;
        Self::from_entities(entities)
    }

    /// Persist inventory state to a JSONL file.
    pub fn save_jsonl(&self, path: impl AsRef<Path>) -> Result<(), InventoryError> {
        write_entities_to_path(path, &self.entities())?;
        Ok(())
    }

    /// All records: statuses, then location types, then locations, each by name.
    pub fn entities(&self) -> Vec<Entity> {
        self.statuses
            .values()
            .cloned()
            .map(Entity::from)
            .chain(self.location_types.values().cloned().map(Entity::from))
            .chain(self.locations.values().cloned().map(Entity::from))
            .collect()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.statuses.len() + self.location_types.len() + self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of successful writes since load. Zero means unchanged.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn statuses(&self) -> impl Iterator<Item = &Status> {
        self.statuses.values()
    }

    pub fn location_types(&self) -> impl Iterator<Item = &LocationType> {
        self.location_types.values()
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn status_by_id(&self, id: RecordId) -> Option<&Status> {
        self.statuses.values().find(|s| s.id == id)
    }

    pub fn location_type_by_id(&self, id: RecordId) -> Option<&LocationType> {
        self.location_types.values().find(|t| t.id == id)
    }

    pub fn location_by_id(&self, id: RecordId) -> Option<&Location> {
        self.locations.values().find(|l| l.id == id)
    }

    /// Locations whose parent is `id`.
    pub fn children_of(&self, id: RecordId) -> impl Iterator<Item = &Location> {
        self.locations.values().filter(move |l| l.parent == Some(id))
    }

    /// Create and persist a status. Used to seed an inventory.
    pub fn add_status(&mut self, name: &str) -> Result<Status, StoreError> {
        let status = Status::new(name);
        self.validate_and_persist(Entity::from(status.clone()))?;
        Ok(status)
    }

    /// Content digest of the canonical JSONL rendering.
    pub fn snapshot_ref(&self) -> String {
        let mut hasher = Sha256::new();
        // Entity serialization is infallible.
        for line in canonical_lines(&self.entities()).unwrap_or_default() {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        format!("{SNAPSHOT_REF_PREFIX}{:x}", hasher.finalize())
    }

    fn parent_present(&self, entity: &Entity) -> bool {
        match entity {
            Entity::Status(_) => true,
            Entity::LocationType(t) => t
                .parent
                .is_none_or(|id| self.location_type_by_id(id).is_some()),
            Entity::Location(l) => {
                self.location_type_by_id(l.location_type).is_some()
                    && l.parent.is_none_or(|id| self.location_by_id(id).is_some())
            }
        }
    }

    fn admit(&mut self, entity: Entity) -> Result<(), InventoryError> {
        let kind = entity.kind();
        let name = entity.name().to_string();
        self.validate(&entity)
            .map_err(|source| InventoryError::Invalid { kind, name, source })?;
        self.insert(entity);
        Ok(())
    }

    fn insert(&mut self, entity: Entity) {
        match entity {
            Entity::Status(s) => {
                self.statuses.insert(s.name.clone(), s);
            }
            Entity::LocationType(t) => {
                self.location_types.insert(t.name.clone(), t);
            }
            Entity::Location(l) => {
                self.locations.insert(l.name.clone(), l);
            }
        }
        self.revision += 1;
    }

    fn contains_id(&self, kind: RecordKind, id: RecordId) -> bool {
        match kind {
            RecordKind::Status => self.status_by_id(id).is_some(),
            RecordKind::LocationType => self.location_type_by_id(id).is_some(),
            RecordKind::Location => self.location_by_id(id).is_some(),
        }
    }

    fn contains_name(&self, kind: RecordKind, name: &str) -> bool {
        match kind {
            RecordKind::Status => self.statuses.contains_key(name),
            RecordKind::LocationType => self.location_types.contains_key(name),
            RecordKind::Location => self.locations.contains_key(name),
        }
    }

    fn validate(&self, entity: &Entity) -> Result<(), ValidationError> {
        let kind = entity.kind();
        let name = entity.name();

        if name.trim().is_empty() {
            return Err(ValidationError::BlankName { kind });
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong {
                kind,
                name: name.to_string(),
                max: MAX_NAME_LEN,
            });
        }
        if self.contains_id(kind, entity.id()) {
            return Err(ValidationError::AlreadyPersisted {
                kind,
                name: name.to_string(),
            });
        }
        if self.contains_name(kind, name) {
            return Err(ValidationError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }

        match entity {
            Entity::Status(_) => Ok(()),
            Entity::LocationType(t) => match t.parent {
                Some(id) if self.location_type_by_id(id).is_none() => {
                    Err(ValidationError::DanglingReference {
                        name: t.name.clone(),
                        target: RecordKind::LocationType,
                        id,
                    })
                }
                _ => Ok(()),
            },
            Entity::Location(l) => self.validate_location(l),
        }
    }

    fn validate_location(&self, location: &Location) -> Result<(), ValidationError> {
        let dangling = |target, id| ValidationError::DanglingReference {
            name: location.name.clone(),
            target,
            id,
        };

        let location_type = self
            .location_type_by_id(location.location_type)
            .ok_or_else(|| dangling(RecordKind::LocationType, location.location_type))?;
        if self.status_by_id(location.status).is_none() {
            return Err(dangling(RecordKind::Status, location.status));
        }
        let parent = match location.parent {
            Some(id) => Some(
                self.location_by_id(id)
                    .ok_or_else(|| dangling(RecordKind::Location, id))?,
            ),
            None => None,
        };

        let expected_type = match location_type.parent {
            Some(id) => Some(
                self.location_type_by_id(id)
                    .ok_or_else(|| dangling(RecordKind::LocationType, id))?,
            ),
            None => None,
        };

        match (expected_type, parent) {
            (None, None) => Ok(()),
            (Some(expected), None) => Err(ValidationError::ParentRequired {
                name: location.name.clone(),
                location_type: location_type.name.clone(),
                parent_type: expected.name.clone(),
            }),
            (expected, Some(parent)) => {
                let actual = self
                    .location_type_by_id(parent.location_type)
                    .map(|t| t.name.clone())
                    .unwrap_or_default();
                match expected {
                    Some(expected) if expected.id == parent.location_type => Ok(()),
                    Some(expected) => Err(ValidationError::ParentTypeMismatch {
                        name: location.name.clone(),
                        location_type: location_type.name.clone(),
                        expected: format!("`{}`", expected.name),
                        actual,
                    }),
                    None => Err(ValidationError::ParentTypeMismatch {
                        name: location.name.clone(),
                        location_type: location_type.name.clone(),
                        expected: "no parent".to_string(),
                        actual,
                    }),
                }
            }
        }
    }
}

impl InventoryStore for MemoryInventory {
    fn find_location_type(&self, name: &str) -> Result<Lookup<LocationType>, StoreError> {
        Ok(self.location_types.get(name).cloned().into())
    }

    fn create_location_type(
        &mut self,
        name: &str,
        parent: Option<&LocationType>,
    ) -> Result<LocationType, StoreError> {
        Ok(LocationType::new(name, parent))
    }

    fn find_location(&self, name: &str) -> Result<Lookup<Location>, StoreError> {
        Ok(self.locations.get(name).cloned().into())
    }

    fn create_location(
        &mut self,
        name: &str,
        location_type: &LocationType,
        status: &Status,
        parent: Option<&Location>,
    ) -> Result<Location, StoreError> {
        Ok(Location::new(name, location_type, status, parent))
    }

    fn find_status(&self, name: &str) -> Result<Lookup<Status>, StoreError> {
        Ok(self.statuses.get(name).cloned().into())
    }

    fn validate_and_persist(&mut self, entity: Entity) -> Result<(), StoreError> {
        self.validate(&entity)?;
        tracing::debug!(kind = %entity.kind(), name = entity.name(), "persisting record");
        self.insert(entity);
        Ok(())
    }
}
