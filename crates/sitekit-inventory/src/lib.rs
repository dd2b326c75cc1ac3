//! # sitekit-inventory
//!
//! Location inventory for sitekit provisioning jobs.
//!
//! This crate provides:
//! - `Status`, `LocationType` and `Location` records
//! - the `InventoryStore` contract (lookup-by-name, create, validate-and-persist)
//! - `MemoryInventory` (canonical in-memory state with store-side validation)
//! - JSONL read/write and lock-scoped atomic mutation of an inventory file
//!
//! ## Data model
//!
//! ```text
//! JSONL (on disk, one line per record)
//!     ↕  load / save (under <path>.lock)
//! MemoryInventory (validated in-memory state)
//!     ↕  InventoryStore
//! provisioning jobs
//! ```

pub mod atomic_store;
pub mod jsonl;
pub mod memory;
pub mod record;
pub mod store;

pub use atomic_store::{AtomicInventoryMutationError, inventory_lock_path, mutate_inventory_jsonl};
pub use jsonl::{
    JsonlError, canonical_lines, parse_line, read_entities_from_path, write_entities_to_path,
};
pub use memory::{InventoryError, MAX_NAME_LEN, MemoryInventory, SNAPSHOT_REF_PREFIX};
pub use record::{Entity, Location, LocationType, ObjectRef, RecordId, RecordKind, Status};
pub use store::{InventoryStore, Lookup, StoreError, ValidationError};
