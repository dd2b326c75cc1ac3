//! Job metadata and the declarative description of its input form.

use crate::inputs::{RegionChoice, StatusChoice};
use serde::Serialize;

/// Identity of a job as shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobMeta {
    pub grouping: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CREATE_SITE_JOB: JobMeta = JobMeta {
    grouping: "Demo Jobs",
    name: "Create Site",
    description: "A job used to demonstrate the jobs feature of Nautobot",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Choice,
    String,
}

/// One input field of a job form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobForm {
    pub job: JobMeta,
    pub fields: Vec<FieldSpec>,
}

impl JobForm {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Form of the Create Site job, in the order fields are asked for.
pub fn create_site_form() -> JobForm {
    JobForm {
        job: CREATE_SITE_JOB,
        fields: vec![
            FieldSpec {
                name: "region_choice",
                label: "Region choice",
                kind: FieldKind::Choice,
                required: true,
                choices: RegionChoice::ALL.iter().map(RegionChoice::as_str).collect(),
                description: Some(
                    "Select the region you would like to add a site to. If it does not exist, it will be created.",
                ),
            },
            FieldSpec {
                name: "site_status_choice",
                label: "Site status choice",
                kind: FieldKind::Choice,
                required: true,
                choices: StatusChoice::ALL.iter().map(StatusChoice::as_str).collect(),
                description: Some("The selected status will apply to the new site."),
            },
            FieldSpec {
                name: "site_name",
                label: "Site name",
                kind: FieldKind::String,
                required: true,
                choices: Vec::new(),
                description: None,
            },
        ],
    }
}
