//! Error types for provisioning runs.

use crate::inputs::InputError;
use crate::provisioner::ProvisionStage;
use sitekit_inventory::{RecordId, RecordKind, StoreError};

/// Why a provisioning run stopped short of creating the site.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// A location with the requested site name is already present.
    ///
    /// A business halt, not a fault: location types and the region from
    /// earlier stages stay in place.
    #[error("site `{site}` already exists")]
    SiteAlreadyExists { site: String, existing: RecordId },

    /// A record the run needs to reference is absent from the store.
    #[error("{kind} `{name}` does not exist in the inventory")]
    DependencyMissing {
        kind: RecordKind,
        name: String,
        stage: ProvisionStage,
    },

    /// The store rejected a read or write.
    #[error("inventory store failed after stage {stage}: {source}")]
    Store {
        stage: ProvisionStage,
        #[source]
        source: StoreError,
    },

    /// Raw inputs did not parse.
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
}

impl ProvisionError {
    /// Last stage completed before the run stopped.
    pub fn stage(&self) -> ProvisionStage {
        match self {
            ProvisionError::SiteAlreadyExists { .. } => ProvisionStage::SiteAlreadyExistsHalt,
            ProvisionError::DependencyMissing { stage, .. } | ProvisionError::Store { stage, .. } => {
                *stage
            }
            ProvisionError::Input(_) => ProvisionStage::Start,
        }
    }

    /// Expected, user-facing halt rather than a failure.
    pub fn is_business_halt(&self) -> bool {
        matches!(self, ProvisionError::SiteAlreadyExists { .. })
    }
}
