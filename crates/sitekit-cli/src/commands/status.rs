use crate::support::{print_json, require_inventory_or_exit};
use serde_json::json;
use sitekit_inventory::mutate_inventory_jsonl;
use std::path::PathBuf;

pub fn run_add(name: String, inventory_path: PathBuf, json_output: bool) {
    require_inventory_or_exit(&inventory_path);

    let status = mutate_inventory_jsonl(&inventory_path, |inventory| {
        inventory.add_status(name.trim())
    })
    .unwrap_or_else(|e| {
        eprintln!("error: cannot add status `{name}`: {e}");
        std::process::exit(1);
    });
    tracing::info!(status = %status.name, id = %status.id, "added status");

    if json_output {
        print_json(&json!({
            "action": "status.add",
            "inventoryPath": inventory_path.display().to_string(),
            "status": {
                "id": status.id,
                "name": status.name,
                "createdAt": status.created_at,
            },
        }));
    } else {
        println!("sitekit status add");
        println!();
        println!("  status: {}", status.name);
        println!("  id: {}", status.id);
        println!("  inventory path: {}", inventory_path.display());
    }
}
