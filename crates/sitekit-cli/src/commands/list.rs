use crate::cli::ListKindArg;
use crate::support::{LocationNames, load_inventory_or_exit, location_names, print_json};
use serde_json::{Value, json};
use sitekit_inventory::{Location, LocationType, MemoryInventory, Status};
use std::path::PathBuf;

fn wants(kind: ListKindArg, section: ListKindArg) -> bool {
    kind == ListKindArg::All || kind == section
}

fn status_json(status: &Status) -> Value {
    json!({
        "id": status.id,
        "name": status.name,
        "createdAt": status.created_at,
    })
}

fn location_type_json(inventory: &MemoryInventory, location_type: &LocationType) -> Value {
    let parent = location_type
        .parent
        .and_then(|id| inventory.location_type_by_id(id))
        .map(|p| p.name.as_str());
    json!({
        "id": location_type.id,
        "name": location_type.name,
        "parent": parent,
        "createdAt": location_type.created_at,
    })
}

fn location_json(inventory: &MemoryInventory, location: &Location) -> Value {
    let names = location_names(inventory, location);
    json!({
        "id": location.id,
        "name": location.name,
        "locationType": names.location_type,
        "status": names.status,
        "parent": names.parent,
        "children": inventory.children_of(location.id).count(),
        "createdAt": location.created_at,
    })
}

fn print_location(location: &Location, names: &LocationNames<'_>) {
    match names.parent {
        Some(parent) => println!(
            "  - {} ({}, {}) in {}",
            location.name, names.location_type, names.status, parent
        ),
        None => println!(
            "  - {} ({}, {})",
            location.name, names.location_type, names.status
        ),
    }
}

pub fn run(kind: ListKindArg, inventory_path: PathBuf, json_output: bool) {
    let inventory = load_inventory_or_exit(&inventory_path);

    if json_output {
        let mut payload = json!({
            "action": "list",
            "inventoryPath": inventory_path.display().to_string(),
            "snapshotRef": inventory.snapshot_ref(),
        });
        if wants(kind, ListKindArg::Statuses) {
            payload["statuses"] = inventory.statuses().map(status_json).collect();
        }
        if wants(kind, ListKindArg::LocationTypes) {
            payload["locationTypes"] = inventory
                .location_types()
                .map(|t| location_type_json(&inventory, t))
                .collect();
        }
        if wants(kind, ListKindArg::Locations) {
            payload["locations"] = inventory
                .locations()
                .map(|l| location_json(&inventory, l))
                .collect();
        }
        print_json(&payload);
        return;
    }

    println!("sitekit list");
    println!();
    println!("  inventory path: {}", inventory_path.display());
    if wants(kind, ListKindArg::Statuses) {
        println!();
        println!("  statuses ({}):", inventory.statuses().count());
        for status in inventory.statuses() {
            println!("  - {}", status.name);
        }
    }
    if wants(kind, ListKindArg::LocationTypes) {
        println!();
        println!("  location types ({}):", inventory.location_types().count());
        for location_type in inventory.location_types() {
            let parent = location_type
                .parent
                .and_then(|id| inventory.location_type_by_id(id));
            match parent {
                Some(parent) => println!("  - {} (parent {})", location_type.name, parent.name),
                None => println!("  - {}", location_type.name),
            }
        }
    }
    if wants(kind, ListKindArg::Locations) {
        println!();
        println!("  locations ({}):", inventory.locations().count());
        for location in inventory.locations() {
            print_location(location, &location_names(&inventory, location));
        }
    }
}
