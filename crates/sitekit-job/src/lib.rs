//! # sitekit-job
//!
//! The Create Site job. Given a region, a status and a site name it ensures
//! the `Region`/`Site` location types exist, ensures the region exists, and
//! creates the site under it, refusing to reuse a site that already exists.
//!
//! ## Architecture
//!
//! ```text
//! JobInputs            ← validated region / status / site name
//!     │
//! SiteProvisioner      ← ensure-exists sequence, one stage at a time
//!     │         ╲
//! InventoryStore   Reporter   ← injected capabilities
//! ```

pub mod error;
pub mod form;
pub mod inputs;
pub mod provisioner;
pub mod report;

pub use error::ProvisionError;
pub use form::{CREATE_SITE_JOB, FieldKind, FieldSpec, JobForm, JobMeta, create_site_form};
pub use inputs::{InputError, JobInputs, RegionChoice, SiteName, StatusChoice};
pub use provisioner::{
    ProvisionReport, ProvisionStage, REGION_TYPE, REQUIRED_LOCATION_TYPES, SITE_TYPE,
    SiteProvisioner, run_job,
};
pub use report::{JobMessage, MessageLevel, Reporter, TracingReporter, Transcript};
