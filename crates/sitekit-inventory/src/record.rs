//! Inventory records: statuses, location types and locations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record identifier. Stable across JSONL round-trips.
pub type RecordId = Uuid;

/// A named lifecycle state attached to locations ("Active", "Planned", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: RecordId,
    pub name: String,
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Status {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A category of location and the type its parent must have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationType {
    pub id: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<RecordId>,
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl LocationType {
    pub fn new(name: impl Into<String>, parent: Option<&LocationType>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            parent: parent.map(|p| p.id),
            created_at: Utc::now(),
        }
    }
}

/// A named node in the location hierarchy.
///
/// Used for both regions (no parent) and sites (parented to a region).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: RecordId,
    pub name: String,
    pub location_type: RecordId,
    pub status: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<RecordId>,
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(
        name: impl Into<String>,
        location_type: &LocationType,
        status: &Status,
        parent: Option<&Location>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            location_type: location_type.id,
            status: status.id,
            parent: parent.map(|p| p.id),
            created_at: Utc::now(),
        }
    }
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Record kind discriminator, also the JSONL `kind` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Status,
    LocationType,
    Location,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Status,
        RecordKind::LocationType,
        RecordKind::Location,
    ];

    /// Kind for a JSONL `kind` tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Status => "status",
            RecordKind::LocationType => "location_type",
            RecordKind::Location => "location",
        }
    }

    /// Human label used in load errors ("Location Type record `Site`").
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Status => "Status",
            RecordKind::LocationType => "Location Type",
            RecordKind::Location => "Location",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any persistable record. One JSONL line per entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Status(Status),
    LocationType(LocationType),
    Location(Location),
}

impl Entity {
    pub fn kind(&self) -> RecordKind {
        match self {
            Entity::Status(_) => RecordKind::Status,
            Entity::LocationType(_) => RecordKind::LocationType,
            Entity::Location(_) => RecordKind::Location,
        }
    }

    pub fn id(&self) -> RecordId {
        match self {
            Entity::Status(s) => s.id,
            Entity::LocationType(t) => t.id,
            Entity::Location(l) => l.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Status(s) => &s.name,
            Entity::LocationType(t) => &t.name,
            Entity::Location(l) => &l.name,
        }
    }
}

impl From<Status> for Entity {
    fn from(value: Status) -> Self {
        Entity::Status(value)
    }
}

impl From<LocationType> for Entity {
    fn from(value: LocationType) -> Self {
        Entity::LocationType(value)
    }
}

impl From<Location> for Entity {
    fn from(value: Location) -> Self {
        Entity::Location(value)
    }
}

/// Lightweight pointer to a record, attached to log messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: RecordKind,
    pub id: RecordId,
    pub name: String,
}

impl From<&Status> for ObjectRef {
    fn from(value: &Status) -> Self {
        Self {
            kind: RecordKind::Status,
            id: value.id,
            name: value.name.clone(),
        }
    }
}

impl From<&LocationType> for ObjectRef {
    fn from(value: &LocationType) -> Self {
        Self {
            kind: RecordKind::LocationType,
            id: value.id,
            name: value.name.clone(),
        }
    }
}

impl From<&Location> for ObjectRef {
    fn from(value: &Location) -> Self {
        Self {
            kind: RecordKind::Location,
            id: value.id,
            name: value.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_serializes_with_kind_tag() {
        let region = LocationType::new("Region", None);
        let line = serde_json::to_string(&Entity::from(region.clone())).expect("serialize");
        assert!(line.contains(r#""kind":"location_type""#));
        assert!(!line.contains("parent"));

        let site = LocationType::new("Site", Some(&region));
        let value = serde_json::to_value(Entity::from(site)).expect("serialize");
        assert_eq!(value["parent"], serde_json::json!(region.id));
    }

    #[test]
    fn kind_tags_match_serde_names() {
        for kind in RecordKind::ALL {
            let tag = serde_json::to_value(kind).expect("serialize");
            assert_eq!(tag, serde_json::json!(kind.as_str()));
            assert_eq!(RecordKind::from_tag(kind.as_str()), Some(kind));
        }
        assert_eq!(RecordKind::from_tag("site"), None);
    }

    #[test]
    fn location_parses_without_timestamp() {
        let raw = r#"{
            "kind":"location",
            "id":"6f1c1f36-4c1e-4d59-9df4-6fc7bd0f1a10",
            "name":"West",
            "location_type":"0a3e1a4c-04d9-4b8c-a0e5-8d1c5c1c4d11",
            "status":"1b2c3d4e-5f60-4718-8293-a4b5c6d7e8f9"
        }"#;

        let entity: Entity = serde_json::from_str(raw).expect("must parse location");
        match entity {
            Entity::Location(location) => {
                assert_eq!(location.name, "West");
                assert!(location.parent.is_none());
            }
            other => panic!("expected location, got {other:?}"),
        }
    }
}
