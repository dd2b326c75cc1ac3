use serde::Serialize;
use sitekit_inventory::{Location, MemoryInventory};
use std::path::Path;

pub fn load_inventory_or_exit(path: &Path) -> MemoryInventory {
    require_inventory_or_exit(path);
    MemoryInventory::load_jsonl(path).unwrap_or_else(|e| {
        eprintln!("error: failed to load {}: {e}", path.display());
        std::process::exit(1);
    })
}

pub fn require_inventory_or_exit(path: &Path) {
    if !path.exists() {
        eprintln!(
            "error: inventory not found: {} (run `sitekit init` first)",
            path.display()
        );
        std::process::exit(1);
    }
}

pub fn print_json(payload: &impl Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(payload).expect("json serialization")
    );
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Type, status and parent names of a location, for display.
pub struct LocationNames<'a> {
    pub location_type: &'a str,
    pub status: &'a str,
    pub parent: Option<&'a str>,
}

pub fn location_names<'a>(
    inventory: &'a MemoryInventory,
    location: &Location,
) -> LocationNames<'a> {
    LocationNames {
        location_type: inventory
            .location_type_by_id(location.location_type)
            .map_or("?", |t| t.name.as_str()),
        status: inventory
            .status_by_id(location.status)
            .map_or("?", |s| s.name.as_str()),
        parent: location
            .parent
            .and_then(|id| inventory.location_by_id(id))
            .map(|p| p.name.as_str()),
    }
}
