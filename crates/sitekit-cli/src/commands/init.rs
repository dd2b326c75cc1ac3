use crate::support::{print_json, yes_no};
use serde_json::json;
use sitekit_inventory::MemoryInventory;
use std::path::{Path, PathBuf};

pub const DEFAULT_STATUSES: [&str; 2] = ["Active", "Planned"];

#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub inventory_path: PathBuf,
    pub statuses: Vec<String>,
    pub replaced_existing: bool,
}

pub fn init_inventory(
    path: impl AsRef<Path>,
    statuses: &[String],
    force: bool,
) -> Result<InitOutcome, String> {
    let inventory_path = path.as_ref().to_path_buf();
    let replaced_existing = inventory_path.exists();
    if replaced_existing && !inventory_path.is_file() {
        return Err(format!(
            "inventory path exists but is not a file: {}",
            inventory_path.display()
        ));
    }
    if replaced_existing && !force {
        return Err(format!(
            "inventory already exists: {} (use --force to replace it)",
            inventory_path.display()
        ));
    }

    let names: Vec<String> = if statuses.is_empty() {
        DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect()
    } else {
        statuses.to_vec()
    };

    let mut inventory = MemoryInventory::new();
    for name in &names {
        inventory
            .add_status(name)
            .map_err(|e| format!("cannot seed status `{name}`: {e}"))?;
    }
    inventory
        .save_jsonl(&inventory_path)
        .map_err(|e| format!("failed to initialize {}: {e}", inventory_path.display()))?;
    tracing::info!(path = %inventory_path.display(), statuses = names.len(), "initialized inventory");

    Ok(InitOutcome {
        inventory_path,
        statuses: names,
        replaced_existing,
    })
}

pub fn run(inventory: PathBuf, statuses: Vec<String>, force: bool, json_output: bool) {
    let outcome = init_inventory(&inventory, &statuses, force).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    if json_output {
        print_json(&json!({
            "action": "init",
            "inventoryPath": outcome.inventory_path.display().to_string(),
            "statuses": outcome.statuses,
            "replacedExisting": outcome.replaced_existing,
        }));
    } else {
        println!("sitekit init");
        println!();
        println!("  inventory path: {}", outcome.inventory_path.display());
        println!("  statuses: {}", outcome.statuses.join(", "));
        println!(
            "  replaced existing: {}",
            yes_no(outcome.replaced_existing)
        );
    }
}
