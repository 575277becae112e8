//! Store state, record keys and the actions that change them.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::ListEdit;
use crate::notes::Note;
use crate::projects::{Project, ProjectStage};
use crate::properties::{PriceHistoryEntry, Property, PropertyStatus};
use crate::requirements::{InternalStatus, Requirement, RequirementStatus};
use crate::tasks::{Task, TaskStatus};

/// Identifies a cached record (or record list) for fetch tracking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Property(String),
    Requirement(String),
    Project(ProjectStage, String),
    Task(String),
    BuilderNames,
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKey::Property(id) => write!(f, "property {}", id),
            RecordKey::Requirement(id) => write!(f, "requirement {}", id),
            RecordKey::Project(stage, id) => write!(f, "{} project {}", stage, id),
            RecordKey::Task(id) => write!(f, "task {}", id),
            RecordKey::BuilderNames => f.write_str("builder names"),
        }
    }
}

/// Outcome of the most recent fetch of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Loading,
    Loaded,
    /// The fetch failed; the view shows an error state with a retry action.
    Failed(String),
}

/// Field-level change to a cached property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    pub status: Option<PropertyStatus>,
    pub price: Option<Option<Decimal>>,
    pub price_per_sqft: Option<Option<Decimal>>,
    pub price_history: Option<ListEdit<PriceHistoryEntry>>,
    pub notes: Option<ListEdit<Note>>,
}

/// Field-level change to a cached requirement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequirementPatch {
    pub requirement_status: Option<RequirementStatus>,
    pub internal_status: Option<InternalStatus>,
    pub notes: Option<ListEdit<Note>>,
    pub matching_properties: Option<ListEdit<String>>,
}

/// Field-level change to a cached task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
}

/// Everything that can change the store.
#[derive(Debug, Clone)]
pub enum Action {
    FetchStarted(RecordKey),
    FetchFailed {
        key: RecordKey,
        message: String,
    },
    PropertiesLoaded(Vec<Property>),
    PropertyPatched {
        property_id: String,
        patch: PropertyPatch,
    },
    RequirementsLoaded(Vec<Requirement>),
    RequirementPatched {
        requirement_id: String,
        patch: RequirementPatch,
    },
    ProjectsLoaded(Vec<Project>),
    /// Sets top-level project fields, keyed by their wire (camelCase) names.
    ProjectFieldsPatched {
        stage: ProjectStage,
        project_id: String,
        fields: Map<String, Value>,
    },
    TasksLoaded(Vec<Task>),
    TaskPatched {
        task_id: String,
        patch: TaskPatch,
    },
    BuilderNamesLoaded(Vec<String>),
    BuilderNameAdded(String),
    /// Drops every cached record; used on shutdown and tenant switch.
    Reset,
}

/// The application state: every record currently cached locally.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub properties: HashMap<String, Property>,
    pub requirements: HashMap<String, Requirement>,
    pub projects: HashMap<(ProjectStage, String), Project>,
    pub tasks: HashMap<String, Task>,
    pub builder_names: BTreeSet<String>,
    pub fetch_status: HashMap<RecordKey, FetchStatus>,
}

impl StoreState {
    pub fn fetch_status(&self, key: &RecordKey) -> Option<&FetchStatus> {
        self.fetch_status.get(key)
    }

    /// Case-insensitive lookup in the known builder names.
    pub fn is_known_builder(&self, name: &str) -> bool {
        let wanted = name.trim();
        self.builder_names
            .iter()
            .any(|known| known.eq_ignore_ascii_case(wanted))
    }
}
