//! Integration tests: Create Site runs against an in-memory inventory.
//!
//! Transcripts are pinned with inline snapshots; store effects are checked
//! by counting records after each run.

use sitekit_inventory::{
    Entity, InventoryStore, Location, LocationType, Lookup, MemoryInventory, RecordKind, Status,
    StoreError,
};
use sitekit_job::{
    JobInputs, MessageLevel, ProvisionError, ProvisionReport, ProvisionStage, SiteProvisioner,
    Transcript,
};
use std::cell::RefCell;

/// Inventory wrapper that logs every store call in order.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryInventory,
    calls: RefCell<Vec<String>>,
}

impl RecordingStore {
    fn seeded() -> Self {
        let mut inner = MemoryInventory::new();
        inner.add_status("Active").expect("seed Active");
        inner.add_status("Planned").expect("seed Planned");
        Self {
            inner,
            calls: RefCell::default(),
        }
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn position(&self, call: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .position(|c| c == call)
            .unwrap_or_else(|| panic!("call `{call}` never happened: {:?}", self.calls.borrow()))
    }

    fn count_locations(&self, name: &str) -> usize {
        self.inner.locations().filter(|l| l.name == name).count()
    }
}

impl InventoryStore for RecordingStore {
    fn find_location_type(&self, name: &str) -> Result<Lookup<LocationType>, StoreError> {
        self.log(format!("find_location_type {name}"));
        self.inner.find_location_type(name)
    }

    fn create_location_type(
        &mut self,
        name: &str,
        parent: Option<&LocationType>,
    ) -> Result<LocationType, StoreError> {
        self.log(format!("create_location_type {name}"));
        self.inner.create_location_type(name, parent)
    }

    fn find_location(&self, name: &str) -> Result<Lookup<Location>, StoreError> {
        self.log(format!("find_location {name}"));
        self.inner.find_location(name)
    }

    fn create_location(
        &mut self,
        name: &str,
        location_type: &LocationType,
        status: &Status,
        parent: Option<&Location>,
    ) -> Result<Location, StoreError> {
        self.log(format!("create_location {name}"));
        self.inner
            .create_location(name, location_type, status, parent)
    }

    fn find_status(&self, name: &str) -> Result<Lookup<Status>, StoreError> {
        self.log(format!("find_status {name}"));
        self.inner.find_status(name)
    }

    fn validate_and_persist(&mut self, entity: Entity) -> Result<(), StoreError> {
        self.log(format!("persist {} {}", entity.kind(), entity.name()));
        self.inner.validate_and_persist(entity)
    }
}

fn run(
    store: &mut RecordingStore,
    region: &str,
    status: &str,
    site: &str,
) -> (Transcript, Result<ProvisionReport, ProvisionError>) {
    let mut transcript = Transcript::new();
    let inputs = JobInputs::parse(region, status, site).expect("valid inputs");
    let result = SiteProvisioner::new(store, &mut transcript).ensure_site(&inputs);
    (transcript, result)
}

#[test]
fn first_run_on_empty_inventory_creates_everything() {
    let mut store = RecordingStore::seeded();
    let (transcript, result) = run(&mut store, "West", "Active", "HQ-West");
    let report = result.expect("first run should succeed");

    insta::assert_snapshot!(transcript.render(), @r"
    [info] Attempting to create a new site in the West region...
    [warning] Location Type Region does not exist and will be created.
    [info] Location Type Region was created.
    [warning] Location Type Site does not exist and will be created.
    [info] Location Type Site was created.
    [warning] Region West does not exist and will be created.
    [info] Region West was created.
    [info] Site HQ-West does not exist and will be created.
    [success] Site HQ-West was created
    ");

    let inventory = &store.inner;
    assert_eq!(inventory.location_types().count(), 2);
    let region_type = inventory
        .location_type_by_id(report.region.location_type)
        .expect("region type");
    let site_type = inventory
        .location_type_by_id(report.site.location_type)
        .expect("site type");
    assert_eq!(region_type.name, "Region");
    assert_eq!(site_type.name, "Site");
    assert_eq!(site_type.parent, Some(region_type.id));

    assert_eq!(report.region.name, "West");
    assert_eq!(report.site.name, "HQ-West");
    assert_eq!(report.site.parent, Some(report.region.id));
    let active = inventory.status_by_id(report.site.status).expect("status");
    assert_eq!(active.name, "Active");
    assert_eq!(report.region.status, report.site.status);
}

#[test]
fn region_type_is_persisted_before_site_type_is_created() {
    let mut store = RecordingStore::seeded();
    run(&mut store, "Central", "Planned", "Hub")
        .1
        .expect("run should succeed");

    let region_persisted = store.position("persist location_type Region");
    let site_created = store.position("create_location_type Site");
    assert!(
        region_persisted < site_created,
        "Site type created before Region type was persisted: {:?}",
        store.calls.borrow()
    );
}

#[test]
fn second_run_with_same_site_halts_without_writes() {
    let mut store = RecordingStore::seeded();
    run(&mut store, "West", "Active", "HQ-West")
        .1
        .expect("first run should succeed");
    let revision = store.inner.revision();
    let snapshot = store.inner.snapshot_ref();

    let (transcript, result) = run(&mut store, "West", "Active", "HQ-West");
    let err = result.expect_err("second run must halt");

    insta::assert_snapshot!(transcript.render(), @r"
    [info] Attempting to create a new site in the West region...
    [info] Location Type Region exists and will be used
    [info] Location Type Site exists and will be used
    [info] Region West exists and will be used.
    [error] Site HQ-West already exists! Stopping Job!
    ");

    assert!(matches!(
        err,
        ProvisionError::SiteAlreadyExists { ref site, .. } if site == "HQ-West"
    ));
    assert_eq!(store.inner.revision(), revision);
    assert_eq!(store.inner.snapshot_ref(), snapshot);
    assert_eq!(store.count_locations("HQ-West"), 1);
    assert_eq!(store.inner.location_types().count(), 2);

    let halt = transcript
        .at_level(MessageLevel::Error)
        .next()
        .expect("halt message");
    let object = halt.object.as_ref().expect("halt names the existing site");
    assert_eq!(object.kind, RecordKind::Location);
    assert_eq!(object.name, "HQ-West");
}

#[test]
fn halt_on_existing_site_keeps_region_created_earlier_in_the_run() {
    let mut store = RecordingStore::seeded();
    run(&mut store, "West", "Active", "sea01")
        .1
        .expect("first run should succeed");
    let revision = store.inner.revision();

    let (transcript, result) = run(&mut store, "East", "Active", "sea01");
    let err = result.expect_err("existing site must halt");

    insta::assert_snapshot!(transcript.render(), @r"
    [info] Attempting to create a new site in the East region...
    [info] Location Type Region exists and will be used
    [info] Location Type Site exists and will be used
    [warning] Region East does not exist and will be created.
    [info] Region East was created.
    [error] Site sea01 already exists! Stopping Job!
    ");

    assert!(matches!(err, ProvisionError::SiteAlreadyExists { .. }));
    assert_eq!(err.stage(), ProvisionStage::SiteAlreadyExistsHalt);
    assert_eq!(store.count_locations("East"), 1);
    assert_eq!(store.count_locations("sea01"), 1);
    assert_eq!(store.inner.revision(), revision + 1);

    let east = store
        .inner
        .find_location("East")
        .expect("lookup")
        .found()
        .expect("East should persist");
    assert_eq!(east.parent, None);
    assert_eq!(store.inner.children_of(east.id).count(), 0);
}

#[test]
fn existing_region_is_reused_for_new_sites() {
    let mut store = RecordingStore::seeded();
    let first = run(&mut store, "West", "Active", "HQ-West")
        .1
        .expect("first run should succeed");
    let second = run(&mut store, "west", "Planned", "Branch-West")
        .1
        .expect("second run should succeed");

    assert!(first.region_created);
    assert!(!second.region_created);
    assert_eq!(second.region, first.region);
    assert_eq!(second.location_types_reused, vec!["Region", "Site"]);
    assert!(second.location_types_created.is_empty());
    assert_eq!(store.count_locations("West"), 1);
    assert_eq!(store.inner.children_of(first.region.id).count(), 2);

    let planned = store
        .inner
        .status_by_id(second.site.status)
        .expect("status");
    assert_eq!(planned.name, "Planned");
    // The reused region keeps the status it was created with.
    assert_ne!(second.region.status, second.site.status);
}

#[test]
fn repeated_runs_for_one_region_never_duplicate_types() {
    let mut store = RecordingStore::seeded();
    for site in ["A", "B", "C"] {
        run(&mut store, "East", "Active", site)
            .1
            .expect("run should succeed");
    }
    assert_eq!(store.inner.location_types().count(), 2);
    assert_eq!(store.count_locations("East"), 1);
    assert_eq!(store.inner.locations().count(), 4);
}

#[test]
fn missing_status_aborts_before_any_location_is_created() {
    let mut store = RecordingStore::default();
    let (transcript, result) = run(&mut store, "West", "Active", "HQ-West");
    let err = result.expect_err("missing status must fail");

    insta::assert_snapshot!(transcript.render(), @r"
    [info] Attempting to create a new site in the West region...
    [warning] Location Type Region does not exist and will be created.
    [info] Location Type Region was created.
    [warning] Location Type Site does not exist and will be created.
    [info] Location Type Site was created.
    [warning] Region West does not exist and will be created.
    [error] Job failed: status `Active` does not exist in the inventory
    ");

    match err {
        ProvisionError::DependencyMissing { kind, name, stage } => {
            assert_eq!(kind, RecordKind::Status);
            assert_eq!(name, "Active");
            assert_eq!(stage, ProvisionStage::TypesEnsured);
        }
        other => panic!("expected DependencyMissing, got {other:?}"),
    }
    assert_eq!(store.inner.locations().count(), 0);
    // Location types from the first stage stay.
    assert_eq!(store.inner.location_types().count(), 2);
}

#[test]
fn missing_status_with_existing_region_fails_at_site_step() {
    let mut store = RecordingStore::seeded();
    run(&mut store, "West", "Active", "HQ-West")
        .1
        .expect("first run should succeed");

    let mut bare = RecordingStore::default();
    let mut entities: Vec<Entity> = store
        .inner
        .entities()
        .into_iter()
        .filter(|e| e.name() != "Planned")
        .collect();
    entities.retain(|e| e.kind() != RecordKind::Location || e.name() == "West");
    bare.inner = MemoryInventory::from_entities(entities).expect("rebuild");

    let (_, result) = run(&mut bare, "West", "Planned", "Annex");
    let err = result.expect_err("missing Planned must fail");
    assert!(matches!(
        err,
        ProvisionError::DependencyMissing {
            kind: RecordKind::Status,
            stage: ProvisionStage::RegionEnsured,
            ..
        }
    ));
    assert_eq!(bare.count_locations("Annex"), 0);
}
