//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::projects::ProjectStage;

/// Facts about record changes, plus user-facing rollback notices.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Property fields were confirmed by the remote store.
    PropertyChanged {
        property_id: String,
        fields: Vec<String>,
    },

    /// A requirement was created from the form.
    RequirementCreated { requirement_id: String },

    /// Requirement fields were confirmed by the remote store.
    RequirementChanged {
        requirement_id: String,
        fields: Vec<String>,
    },

    /// A builder name was added to the known-name list.
    BuilderAdded { name: String },

    /// Edited project fields were saved.
    ProjectUpdated {
        stage: ProjectStage,
        project_id: String,
        fields: Vec<String>,
    },

    TaskCreated { task_id: String },

    TaskChanged { task_id: String },

    /// A remote write failed and its optimistic change was reverted.
    /// Rendered as a transient notification.
    MutationRolledBack { target: String, message: String },
}

impl DomainEvent {
    pub fn property_changed(property_id: impl Into<String>, fields: &[&str]) -> Self {
        Self::PropertyChanged {
            property_id: property_id.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn requirement_changed(requirement_id: impl Into<String>, fields: &[&str]) -> Self {
        Self::RequirementChanged {
            requirement_id: requirement_id.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn mutation_rolled_back(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MutationRolledBack {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Event name used on the wire (SSE `event:` field).
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::PropertyChanged { .. } => "property:changed",
            DomainEvent::RequirementCreated { .. } => "requirement:created",
            DomainEvent::RequirementChanged { .. } => "requirement:changed",
            DomainEvent::BuilderAdded { .. } => "builder:added",
            DomainEvent::ProjectUpdated { .. } => "project:updated",
            DomainEvent::TaskCreated { .. } => "task:created",
            DomainEvent::TaskChanged { .. } => "task:changed",
            DomainEvent::MutationRolledBack { .. } => "mutation:rolled-back",
        }
    }

    pub fn is_rollback(&self) -> bool {
        matches!(self, DomainEvent::MutationRolledBack { .. })
    }
}
