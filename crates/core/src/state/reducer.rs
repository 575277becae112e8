//! The reducer: the only code that writes to [`StoreState`].

use log::warn;
use serde_json::Value;

use super::state_model::{
    Action, FetchStatus, PropertyPatch, RecordKey, RequirementPatch, StoreState, TaskPatch,
};
use crate::projects::Project;
use crate::properties::Property;
use crate::requirements::Requirement;
use crate::tasks::Task;

pub(super) fn reduce(state: &mut StoreState, action: Action) {
    match action {
        Action::FetchStarted(key) => {
            state.fetch_status.insert(key, FetchStatus::Loading);
        }
        Action::FetchFailed { key, message } => {
            state.fetch_status.insert(key, FetchStatus::Failed(message));
        }
        Action::PropertiesLoaded(properties) => {
            for property in properties {
                state.fetch_status.insert(
                    RecordKey::Property(property.property_id.clone()),
                    FetchStatus::Loaded,
                );
                state
                    .properties
                    .insert(property.property_id.clone(), property);
            }
        }
        Action::PropertyPatched { property_id, patch } => {
            match state.properties.get_mut(&property_id) {
                Some(property) => patch_property(property, patch),
                None => warn!("Ignoring patch for uncached property {}", property_id),
            }
        }
        Action::RequirementsLoaded(requirements) => {
            for requirement in requirements {
                state.fetch_status.insert(
                    RecordKey::Requirement(requirement.requirement_id.clone()),
                    FetchStatus::Loaded,
                );
                state
                    .requirements
                    .insert(requirement.requirement_id.clone(), requirement);
            }
        }
        Action::RequirementPatched {
            requirement_id,
            patch,
        } => match state.requirements.get_mut(&requirement_id) {
            Some(requirement) => patch_requirement(requirement, patch),
            None => warn!("Ignoring patch for uncached requirement {}", requirement_id),
        },
        Action::ProjectsLoaded(projects) => {
            for project in projects {
                let key = (project.stage, project.project_id.clone());
                state.fetch_status.insert(
                    RecordKey::Project(project.stage, project.project_id.clone()),
                    FetchStatus::Loaded,
                );
                state.projects.insert(key, project);
            }
        }
        Action::ProjectFieldsPatched {
            stage,
            project_id,
            fields,
        } => {
            let key = (stage, project_id);
            match state.projects.get_mut(&key) {
                Some(project) => {
                    if let Some(patched) = merge_project_fields(project, fields) {
                        *project = patched;
                    }
                }
                None => warn!("Ignoring patch for uncached {} project {}", key.0, key.1),
            }
        }
        Action::TasksLoaded(tasks) => {
            for task in tasks {
                state
                    .fetch_status
                    .insert(RecordKey::Task(task.task_id.clone()), FetchStatus::Loaded);
                state.tasks.insert(task.task_id.clone(), task);
            }
        }
        Action::TaskPatched { task_id, patch } => match state.tasks.get_mut(&task_id) {
            Some(task) => patch_task(task, patch),
            None => warn!("Ignoring patch for uncached task {}", task_id),
        },
        Action::BuilderNamesLoaded(names) => {
            state.builder_names = names
                .into_iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect();
            state
                .fetch_status
                .insert(RecordKey::BuilderNames, FetchStatus::Loaded);
        }
        Action::BuilderNameAdded(name) => {
            let name = name.trim();
            if !name.is_empty() {
                state.builder_names.insert(name.to_string());
            }
        }
        Action::Reset => {
            *state = StoreState::default();
        }
    }
}

fn patch_property(property: &mut Property, patch: PropertyPatch) {
    if let Some(status) = patch.status {
        property.status = status;
    }
    if let Some(price) = patch.price {
        property.price = price;
    }
    if let Some(price_per_sqft) = patch.price_per_sqft {
        property.price_per_sqft = price_per_sqft;
    }
    if let Some(edit) = patch.price_history {
        edit.apply(&mut property.price_history);
    }
    if let Some(edit) = patch.notes {
        edit.apply(&mut property.notes);
    }
}

fn patch_requirement(requirement: &mut Requirement, patch: RequirementPatch) {
    if let Some(status) = patch.requirement_status {
        requirement.requirement_status = status;
    }
    if let Some(status) = patch.internal_status {
        requirement.internal_status = status;
    }
    if let Some(edit) = patch.notes {
        edit.apply(&mut requirement.notes);
    }
    if let Some(edit) = patch.matching_properties {
        edit.apply(&mut requirement.matching_properties);
    }
}

fn patch_task(task: &mut Task, patch: TaskPatch) {
    if let Some(status) = patch.status {
        task.status = status;
    }
}

/// Overlays wire-named fields onto a project. Returns `None` (leaving the
/// cached project untouched) if the result no longer decodes as a project.
fn merge_project_fields(
    project: &Project,
    fields: serde_json::Map<String, Value>,
) -> Option<Project> {
    let mut value = match serde_json::to_value(project) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return None,
        Err(e) => {
            warn!("Failed to encode project {}: {}", project.project_id, e);
            return None;
        }
    };
    for (key, field) in fields {
        value.insert(key, field);
    }
    match serde_json::from_value::<Project>(Value::Object(value)) {
        Ok(mut patched) => {
            patched.stage = project.stage;
            patched.project_id = project.project_id.clone();
            Some(patched)
        }
        Err(e) => {
            warn!(
                "Discarding project patch for {}: {}",
                project.project_id, e
            );
            None
        }
    }
}
