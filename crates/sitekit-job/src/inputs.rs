//! Validated job inputs.
//!
//! Region and status are closed choices; the site name is free text that
//! must survive the store's name rules.

use serde::{Deserialize, Serialize};
use sitekit_inventory::MAX_NAME_LEN;

/// Errors raised while parsing raw job inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown region `{value}` (expected one of: West, Central, East)")]
    UnknownRegion { value: String },

    #[error("unknown site status `{value}` (expected one of: Active, Planned)")]
    UnknownStatus { value: String },

    #[error("site name is required")]
    BlankSiteName,

    #[error("site name is {len} characters long (max {max})")]
    SiteNameTooLong { len: usize, max: usize },
}

/// Region the new site is added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionChoice {
    West,
    Central,
    East,
}

impl RegionChoice {
    pub const ALL: [RegionChoice; 3] = [RegionChoice::West, RegionChoice::Central, RegionChoice::East];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionChoice::West => "West",
            RegionChoice::Central => "Central",
            RegionChoice::East => "East",
        }
    }
}

impl std::fmt::Display for RegionChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RegionChoice {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "west" => Ok(Self::West),
            "central" => Ok(Self::Central),
            "east" => Ok(Self::East),
            _ => Err(InputError::UnknownRegion {
                value: s.to_string(),
            }),
        }
    }
}

/// Lifecycle status applied to the new site (and to a newly created region).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusChoice {
    Active,
    Planned,
}

impl StatusChoice {
    pub const ALL: [StatusChoice; 2] = [StatusChoice::Active, StatusChoice::Planned];

    /// Canonical store name. Status lookups are exact, so this casing matters.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusChoice::Active => "Active",
            StatusChoice::Planned => "Planned",
        }
    }
}

impl std::fmt::Display for StatusChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StatusChoice {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "planned" => Ok(Self::Planned),
            _ => Err(InputError::UnknownStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Trimmed, non-empty site name within the store's name width.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteName(String);

impl SiteName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InputError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InputError::BlankSiteName);
        }
        let len = trimmed.chars().count();
        if len > MAX_NAME_LEN {
            return Err(InputError::SiteNameTooLong {
                len,
                max: MAX_NAME_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SiteName {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SiteName> for String {
    fn from(value: SiteName) -> Self {
        value.0
    }
}

impl std::fmt::Display for SiteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three inputs of the Create Site job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInputs {
    pub region: RegionChoice,
    pub status: StatusChoice,
    pub site_name: SiteName,
}

impl JobInputs {
    pub fn new(region: RegionChoice, status: StatusChoice, site_name: SiteName) -> Self {
        Self {
            region,
            status,
            site_name,
        }
    }

    /// Parse raw text inputs, checking region first, then status, then name.
    pub fn parse(region: &str, status: &str, site_name: &str) -> Result<Self, InputError> {
        Ok(Self::new(
            region.parse()?,
            status.parse()?,
            SiteName::new(site_name)?,
        ))
    }
}
