//! Pre-launch and post-RERA project catalog models.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{POST_RERA_PROJECTS_COLLECTION, PRE_LAUNCH_PROJECTS_COLLECTION};
use crate::errors::{Error, Result, ValidationError};
use crate::state::HasId;
use crate::utils::{join_or_fallback, DisplayFallback};

/// Which catalog a project belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ProjectStage {
    #[default]
    PreLaunch,
    PostRera,
}

impl ProjectStage {
    pub fn collection(&self) -> &'static str {
        match self {
            ProjectStage::PreLaunch => PRE_LAUNCH_PROJECTS_COLLECTION,
            ProjectStage::PostRera => POST_RERA_PROJECTS_COLLECTION,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStage::PreLaunch => "preLaunch",
            ProjectStage::PostRera => "postRera",
        }
    }
}

impl std::fmt::Display for ProjectStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "prelaunch" => Ok(ProjectStage::PreLaunch),
            "postrera" => Ok(ProjectStage::PostRera),
            _ => Err(ValidationError::invalid(format!("Unknown project stage '{}'", s)).into()),
        }
    }
}

/// A row of the unit-type table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UnitType {
    pub configuration: String,
    #[serde(default)]
    pub carpet_area: Option<Decimal>,
    /// Price in lakhs.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub count: Option<u32>,
}

/// A brochure, floor plan or approval attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDetail {
    pub phase_name: String,
    #[serde(default)]
    pub towers: Option<u32>,
    #[serde(default)]
    pub units: Option<u32>,
    #[serde(default)]
    pub possession_date: Option<NaiveDate>,
}

/// Domain model representing a pre-launch or post-RERA project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    #[serde(default)]
    pub stage: ProjectStage,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub builder_name: Option<String>,
    #[serde(default)]
    pub micromarket: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub rera_number: Option<String>,
    #[serde(default)]
    pub launch_date: Option<NaiveDate>,
    #[serde(default)]
    pub possession_date: Option<NaiveDate>,
    /// Land area in acres.
    #[serde(default)]
    pub total_land_area: Option<Decimal>,
    #[serde(default)]
    pub unit_types: Vec<UnitType>,
    #[serde(default)]
    pub documents: Vec<ProjectDocument>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub phase_details: Vec<PhaseDetail>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl HasId for Project {
    fn id(&self) -> &str {
        &self.project_id
    }
}

impl Project {
    /// Validates an edited project before its changes are submitted.
    pub fn validate(&self) -> Result<()> {
        if self
            .project_name
            .as_deref()
            .map_or(true, |n| n.trim().is_empty())
        {
            return Err(ValidationError::missing("projectName").into());
        }
        if self.stage == ProjectStage::PostRera
            && self
                .rera_number
                .as_deref()
                .map_or(true, |n| n.trim().is_empty())
        {
            return Err(ValidationError::missing("reraNumber").into());
        }
        if self
            .unit_types
            .iter()
            .any(|u| u.configuration.trim().is_empty())
        {
            return Err(ValidationError::missing("unitTypes.configuration").into());
        }
        if self.documents.iter().any(|d| d.url.trim().is_empty()) {
            return Err(ValidationError::missing("documents.url").into());
        }
        Ok(())
    }
}

/// Catalog-row view of a project with display fallbacks applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_id: String,
    pub stage: ProjectStage,
    pub project_name: String,
    pub builder_name: String,
    pub micromarket: String,
    pub rera_number: String,
    pub possession_date: String,
    pub configurations: String,
    pub amenities: String,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        let configurations: Vec<&str> = project
            .unit_types
            .iter()
            .map(|u| u.configuration.as_str())
            .collect();
        Self {
            project_id: project.project_id.clone(),
            stage: project.stage,
            project_name: project.project_name.display_or_fallback(),
            builder_name: project.builder_name.display_or_fallback(),
            micromarket: project.micromarket.display_or_fallback(),
            rera_number: project.rera_number.display_or_fallback(),
            possession_date: project.possession_date.display_or_fallback(),
            configurations: join_or_fallback(&configurations),
            amenities: join_or_fallback(&project.amenities),
        }
    }
}
