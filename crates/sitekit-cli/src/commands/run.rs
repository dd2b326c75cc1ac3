use crate::support::{print_json, require_inventory_or_exit};
use serde_json::json;
use sitekit_inventory::mutate_inventory_jsonl;
use sitekit_job::{ProvisionError, ProvisionReport, TracingReporter, Transcript, run_job};
use std::convert::Infallible;
use std::path::PathBuf;

pub const EXIT_FAILED: i32 = 1;
pub const EXIT_INVALID_INPUT: i32 = 2;
pub const EXIT_SITE_EXISTS: i32 = 3;

pub struct Args {
    pub region: String,
    pub status: String,
    pub site: String,
    pub inventory: PathBuf,
    pub json: bool,
}

struct RunOutcome {
    result: Result<ProvisionReport, ProvisionError>,
    snapshot_before: String,
    snapshot_after: String,
}

fn exit_code(result: &Result<ProvisionReport, ProvisionError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(ProvisionError::SiteAlreadyExists { .. }) => EXIT_SITE_EXISTS,
        Err(ProvisionError::Input(_)) => EXIT_INVALID_INPUT,
        Err(_) => EXIT_FAILED,
    }
}

fn outcome_label(result: &Result<ProvisionReport, ProvisionError>) -> &'static str {
    match result {
        Ok(_) => "created",
        Err(ProvisionError::SiteAlreadyExists { .. }) => "site_already_exists",
        Err(ProvisionError::Input(_)) => "invalid_input",
        Err(_) => "failed",
    }
}

pub fn run(args: Args) {
    require_inventory_or_exit(&args.inventory);

    let mut transcript = Transcript::new();
    let outcome = mutate_inventory_jsonl(&args.inventory, |inventory| {
        let snapshot_before = inventory.snapshot_ref();
        let mut reporter = (&mut transcript, TracingReporter);
        // Stages already reached stay durable, so every result is written back.
        let result = run_job(
            inventory,
            &mut reporter,
            &args.region,
            &args.status,
            &args.site,
        );
        Ok::<_, Infallible>(RunOutcome {
            result,
            snapshot_before,
            snapshot_after: inventory.snapshot_ref(),
        })
    })
    .unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_FAILED);
    });

    let code = exit_code(&outcome.result);
    let stage = match &outcome.result {
        Ok(report) => report.stage,
        Err(err) => err.stage(),
    };

    if args.json {
        let (report, error) = match &outcome.result {
            Ok(report) => (Some(report), None),
            Err(err) => (None, Some(err.to_string())),
        };
        print_json(&json!({
            "action": "run",
            "inventoryPath": args.inventory.display().to_string(),
            "inputs": {
                "region": args.region,
                "status": args.status,
                "site": args.site,
            },
            "outcome": outcome_label(&outcome.result),
            "stage": stage,
            "report": report,
            "error": error,
            "messages": transcript.messages(),
            "snapshotBefore": outcome.snapshot_before,
            "snapshotAfter": outcome.snapshot_after,
            "changed": outcome.snapshot_before != outcome.snapshot_after,
        }));
    } else {
        println!("sitekit run");
        println!();
        for message in transcript.messages() {
            println!("  {message}");
        }
        println!();
        match &outcome.result {
            Ok(report) => println!(
                "  Result: site {} created in region {}",
                report.site.name, report.region.name
            ),
            Err(err) if err.is_business_halt() => println!("  Result: halted: {err}"),
            Err(err) => println!("  Result: failed at {stage}: {err}"),
        }
        println!("  Inventory: {}", args.inventory.display());
    }

    if code != 0 {
        std::process::exit(code);
    }
}
