//! The Create Site job: ensure location types, ensure region, create site.
//!
//! ```text
//! Start → TypesEnsured → RegionEnsured → SiteCreated
//!                                      ↘ SiteAlreadyExistsHalt
//! ```
//!
//! Stages are durable once reached. A run halted at the site step keeps the
//! location types and region it created.

use crate::error::ProvisionError;
use crate::inputs::JobInputs;
use crate::report::{JobMessage, MessageLevel, Reporter};
use serde::{Deserialize, Serialize};
use sitekit_inventory::{
    Entity, InventoryStore, Location, LocationType, Lookup, RecordKind, Status, StoreError,
};

pub const REGION_TYPE: &str = "Region";
pub const SITE_TYPE: &str = "Site";

/// Location types the job relies on, parents first.
pub const REQUIRED_LOCATION_TYPES: [(&str, Option<&str>); 2] =
    [(REGION_TYPE, None), (SITE_TYPE, Some(REGION_TYPE))];

/// Progress of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionStage {
    Start,
    TypesEnsured,
    RegionEnsured,
    SiteCreated,
    SiteAlreadyExistsHalt,
}

impl ProvisionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisionStage::Start => "start",
            ProvisionStage::TypesEnsured => "types_ensured",
            ProvisionStage::RegionEnsured => "region_ensured",
            ProvisionStage::SiteCreated => "site_created",
            ProvisionStage::SiteAlreadyExistsHalt => "site_already_exists_halt",
        }
    }
}

impl std::fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionReport {
    pub location_types_created: Vec<String>,
    pub location_types_reused: Vec<String>,
    pub region: Location,
    pub region_created: bool,
    pub site: Location,
    pub stage: ProvisionStage,
}

/// Runs the ensure-exists sequence against a store, reporting each step.
pub struct SiteProvisioner<'a, S: ?Sized, R: ?Sized> {
    store: &'a mut S,
    reporter: &'a mut R,
    stage: ProvisionStage,
}

impl<'a, S, R> SiteProvisioner<'a, S, R>
where
    S: InventoryStore + ?Sized,
    R: Reporter + ?Sized,
{
    pub fn new(store: &'a mut S, reporter: &'a mut R) -> Self {
        Self {
            store,
            reporter,
            stage: ProvisionStage::Start,
        }
    }

    /// Stage reached by the most recent run.
    pub fn stage(&self) -> ProvisionStage {
        self.stage
    }

    /// Ensure the region and create the site named in `inputs`.
    ///
    /// Fails with [`ProvisionError::SiteAlreadyExists`] rather than reusing an
    /// existing site. Nothing is rolled back on failure.
    pub fn ensure_site(&mut self, inputs: &JobInputs) -> Result<ProvisionReport, ProvisionError> {
        let _span = tracing::info_span!(
            "ensure_site",
            region = %inputs.region,
            status = %inputs.status,
            site = %inputs.site_name,
        )
        .entered();

        self.stage = ProvisionStage::Start;
        let result = self.run_stages(inputs);
        if let Err(err) = &result
            && !err.is_business_halt()
        {
            self.emit(JobMessage::new(
                MessageLevel::Error,
                format!("Job failed: {err}"),
            ));
        }
        result
    }

    fn run_stages(&mut self, inputs: &JobInputs) -> Result<ProvisionReport, ProvisionError> {
        self.emit(JobMessage::new(
            MessageLevel::Info,
            format!(
                "Attempting to create a new site in the {} region...",
                inputs.region
            ),
        ));

        let (location_types_created, location_types_reused) = self.ensure_location_types()?;
        self.stage = ProvisionStage::TypesEnsured;

        let (region, region_created) = self.ensure_region(inputs)?;
        self.stage = ProvisionStage::RegionEnsured;

        let site = self.create_site(inputs, &region)?;
        self.stage = ProvisionStage::SiteCreated;

        Ok(ProvisionReport {
            location_types_created,
            location_types_reused,
            region,
            region_created,
            site,
            stage: self.stage,
        })
    }

    fn ensure_location_types(&mut self) -> Result<(Vec<String>, Vec<String>), ProvisionError> {
        let mut created = Vec::new();
        let mut reused = Vec::new();

        for (name, parent) in REQUIRED_LOCATION_TYPES {
            match self.store.find_location_type(name).map_err(|e| self.store_error(e))? {
                Lookup::Found(location_type) => {
                    self.emit(
                        JobMessage::new(
                            MessageLevel::Info,
                            format!("Location Type {} exists and will be used", location_type.name),
                        )
                        .with_object(&location_type),
                    );
                    reused.push(location_type.name);
                }
                Lookup::NotFound => {
                    self.emit(JobMessage::new(
                        MessageLevel::Warning,
                        format!("Location Type {name} does not exist and will be created."),
                    ));
                    let parent = match parent {
                        Some(parent) => Some(self.require_location_type(parent)?),
                        None => None,
                    };
                    let location_type = self
                        .store
                        .create_location_type(name, parent.as_ref())
                        .map_err(|e| self.store_error(e))?;
                    self.persist(location_type.clone())?;
                    self.emit(
                        JobMessage::new(
                            MessageLevel::Info,
                            format!("Location Type {} was created.", location_type.name),
                        )
                        .with_object(&location_type),
                    );
                    created.push(location_type.name);
                }
            }
        }

        Ok((created, reused))
    }

    fn ensure_region(&mut self, inputs: &JobInputs) -> Result<(Location, bool), ProvisionError> {
        let name = inputs.region.as_str();
        match self.store.find_location(name).map_err(|e| self.store_error(e))? {
            Lookup::Found(region) => {
                self.emit(
                    JobMessage::new(
                        MessageLevel::Info,
                        format!("Region {} exists and will be used.", region.name),
                    )
                    .with_object(&region),
                );
                Ok((region, false))
            }
            Lookup::NotFound => {
                self.emit(JobMessage::new(
                    MessageLevel::Warning,
                    format!("Region {name} does not exist and will be created."),
                ));
                let region_type = self.require_location_type(REGION_TYPE)?;
                let status = self.require_status(inputs.status.as_str())?;
                let region = self
                    .store
                    .create_location(name, &region_type, &status, None)
                    .map_err(|e| self.store_error(e))?;
                self.persist(region.clone())?;
                self.emit(
                    JobMessage::new(
                        MessageLevel::Info,
                        format!("Region {} was created.", region.name),
                    )
                    .with_object(&region),
                );
                Ok((region, true))
            }
        }
    }

    fn create_site(
        &mut self,
        inputs: &JobInputs,
        region: &Location,
    ) -> Result<Location, ProvisionError> {
        let name = inputs.site_name.as_str();
        match self.store.find_location(name).map_err(|e| self.store_error(e))? {
            Lookup::Found(existing) => {
                self.stage = ProvisionStage::SiteAlreadyExistsHalt;
                self.emit(
                    JobMessage::new(
                        MessageLevel::Error,
                        format!("Site {name} already exists! Stopping Job!"),
                    )
                    .with_object(&existing),
                );
                Err(ProvisionError::SiteAlreadyExists {
                    site: existing.name,
                    existing: existing.id,
                })
            }
            Lookup::NotFound => {
                self.emit(JobMessage::new(
                    MessageLevel::Info,
                    format!("Site {name} does not exist and will be created."),
                ));
                let site_type = self.require_location_type(SITE_TYPE)?;
                let status = self.require_status(inputs.status.as_str())?;
                let site = self
                    .store
                    .create_location(name, &site_type, &status, Some(region))
                    .map_err(|e| self.store_error(e))?;
                self.persist(site.clone())?;
                self.emit(
                    JobMessage::new(MessageLevel::Success, format!("Site {} was created", site.name))
                        .with_object(&site),
                );
                Ok(site)
            }
        }
    }

    fn require_location_type(&self, name: &str) -> Result<LocationType, ProvisionError> {
        match self.store.find_location_type(name).map_err(|e| self.store_error(e))? {
            Lookup::Found(location_type) => Ok(location_type),
            Lookup::NotFound => Err(self.missing(RecordKind::LocationType, name)),
        }
    }

    fn require_status(&self, name: &str) -> Result<Status, ProvisionError> {
        match self.store.find_status(name).map_err(|e| self.store_error(e))? {
            Lookup::Found(status) => Ok(status),
            Lookup::NotFound => Err(self.missing(RecordKind::Status, name)),
        }
    }

    fn persist(&mut self, entity: impl Into<Entity>) -> Result<(), ProvisionError> {
        self.store
            .validate_and_persist(entity.into())
            .map_err(|e| self.store_error(e))
    }

    fn missing(&self, kind: RecordKind, name: &str) -> ProvisionError {
        ProvisionError::DependencyMissing {
            kind,
            name: name.to_string(),
            stage: self.stage,
        }
    }

    fn store_error(&self, source: StoreError) -> ProvisionError {
        ProvisionError::Store {
            stage: self.stage,
            source,
        }
    }

    fn emit(&mut self, message: JobMessage) {
        self.reporter.report(message);
    }
}

/// Parse raw inputs and run the Create Site job once.
///
/// Invalid inputs are reported and returned as [`ProvisionError::Input`]
/// without touching the store.
pub fn run_job<S, R>(
    store: &mut S,
    reporter: &mut R,
    region: &str,
    status: &str,
    site_name: &str,
) -> Result<ProvisionReport, ProvisionError>
where
    S: InventoryStore + ?Sized,
    R: Reporter + ?Sized,
{
    let inputs = match JobInputs::parse(region, status, site_name) {
        Ok(inputs) => inputs,
        Err(err) => {
            let err = ProvisionError::from(err);
            reporter.report(JobMessage::new(
                MessageLevel::Error,
                format!("Job failed: {err}"),
            ));
            return Err(err);
        }
    };
    SiteProvisioner::new(store, reporter).ensure_site(&inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Transcript;
    use sitekit_inventory::MemoryInventory;

    fn inventory() -> MemoryInventory {
        let mut inventory = MemoryInventory::new();
        inventory.add_status("Active").expect("seed");
        inventory.add_status("Planned").expect("seed");
        inventory
    }

    #[test]
    fn stage_advances_to_site_created() {
        let mut store = inventory();
        let mut transcript = Transcript::new();
        let inputs = JobInputs::parse("East", "Planned", "Depot").expect("inputs");

        let mut provisioner = SiteProvisioner::new(&mut store, &mut transcript);
        let report = provisioner.ensure_site(&inputs).expect("run should succeed");
        assert_eq!(provisioner.stage(), ProvisionStage::SiteCreated);
        assert_eq!(report.stage, ProvisionStage::SiteCreated);
        assert_eq!(report.location_types_created, vec!["Region", "Site"]);
        assert!(report.location_types_reused.is_empty());
        assert!(report.region_created);
        assert_eq!(report.site.parent, Some(report.region.id));
    }

    #[test]
    fn halt_stage_is_recorded_on_duplicate_site() {
        let mut store = inventory();
        let mut transcript = Transcript::new();
        let inputs = JobInputs::parse("East", "Active", "Depot").expect("inputs");

        SiteProvisioner::new(&mut store, &mut transcript)
            .ensure_site(&inputs)
            .expect("first run should succeed");

        let mut provisioner = SiteProvisioner::new(&mut store, &mut transcript);
        let err = provisioner
            .ensure_site(&inputs)
            .expect_err("second run must halt");
        assert!(err.is_business_halt());
        assert_eq!(err.stage(), ProvisionStage::SiteAlreadyExistsHalt);
        assert_eq!(provisioner.stage(), ProvisionStage::SiteAlreadyExistsHalt);
    }

    #[test]
    fn invalid_input_is_reported_and_store_untouched() {
        let mut store = inventory();
        let mut transcript = Transcript::new();
        let err = run_job(&mut store, &mut transcript, "North", "Active", "Depot")
            .expect_err("unknown region must fail");

        assert!(matches!(err, ProvisionError::Input(_)));
        assert_eq!(err.stage(), ProvisionStage::Start);
        assert_eq!(store.revision(), 2);
        assert_eq!(
            transcript.render(),
            "[error] Job failed: invalid input: unknown region `North` (expected one of: West, Central, East)"
        );
    }

    #[test]
    fn store_rejection_carries_stage() {
        let mut store = inventory();
        let mut transcript = Transcript::new();
        // A location squatting on the region's name with the wrong type makes
        // the site's parent check fail at the store.
        let depot_type = LocationType::new("Depot", None);
        store
            .validate_and_persist(depot_type.clone().into())
            .expect("type");
        let active = store.find_status("Active").expect("lookup").found().expect("status");
        store
            .validate_and_persist(Location::new("West", &depot_type, &active, None).into())
            .expect("squatter");

        let err = run_job(&mut store, &mut transcript, "West", "Active", "HQ-West")
            .expect_err("parent type mismatch must fail");
        match err {
            ProvisionError::Store { stage, source } => {
                assert_eq!(stage, ProvisionStage::RegionEnsured);
                assert!(matches!(
                    source,
                    StoreError::Validation(sitekit_inventory::ValidationError::ParentTypeMismatch { .. })
                ));
            }
            other => panic!("expected store error, got {other:?}"),
        }
        assert!(store.find_location("HQ-West").expect("lookup") == Lookup::NotFound);
        assert_eq!(transcript.max_level(), Some(MessageLevel::Error));
    }
}
