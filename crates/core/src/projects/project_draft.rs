//! Draft-versus-original editing for projects.
//!
//! Edit mode copies the project into a draft. Saving compares the draft with
//! the original field by field and submits only the fields that differ.

use serde_json::{Map, Value};

use super::projects_model::Project;
use crate::errors::{Error, Result};

/// Fields that identify the record or are maintained by the store.
const READ_ONLY_FIELDS: &[&str] = &["projectId", "stage", "createdAt", "updatedAt"];

/// An in-progress edit of a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    original: Project,
    edited: Project,
}

impl ProjectDraft {
    /// Enters edit mode with an untouched copy of `original`.
    pub fn begin(original: Project) -> Self {
        let edited = original.clone();
        Self { original, edited }
    }

    /// Builds a draft from an original and an already edited copy.
    pub fn with_edits(original: Project, mut edited: Project) -> Self {
        edited.project_id = original.project_id.clone();
        edited.stage = original.stage;
        Self { original, edited }
    }

    pub fn original(&self) -> &Project {
        &self.original
    }

    pub fn edited(&self) -> &Project {
        &self.edited
    }

    pub fn edited_mut(&mut self) -> &mut Project {
        &mut self.edited
    }

    /// Throws away the edits.
    pub fn discard(&mut self) {
        self.edited = self.original.clone();
    }

    pub fn is_dirty(&self) -> bool {
        self.changes().map(|c| !c.is_empty()).unwrap_or(true)
    }

    /// Fields whose edited value differs from the original, keyed by wire name.
    ///
    /// Every field, scalar or nested, is compared by value. Array fields such
    /// as `amenities` count as changed when their contents differ, whether or
    /// not the list was rebuilt. A field absent on one side and `null` on the
    /// other is unchanged.
    pub fn changes(&self) -> Result<Map<String, Value>> {
        let original = as_object(&self.original)?;
        let edited = as_object(&self.edited)?;
        Ok(diff_objects(&original, &edited))
    }

    /// The original values of the fields in `changes`, used to undo them.
    pub fn original_values(&self, changes: &Map<String, Value>) -> Result<Map<String, Value>> {
        let original = as_object(&self.original)?;
        Ok(changes
            .keys()
            .map(|key| {
                (
                    key.clone(),
                    original.get(key).cloned().unwrap_or(Value::Null),
                )
            })
            .collect())
    }
}

fn as_object(project: &Project) -> Result<Map<String, Value>> {
    match serde_json::to_value(project)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Unexpected(format!(
            "Project encoded as non-object: {}",
            other
        ))),
    }
}

/// Top-level difference between two encoded records.
pub(crate) fn diff_objects(original: &Map<String, Value>, edited: &Map<String, Value>) -> Map<String, Value> {
    let mut changes = Map::new();
    for (key, new_value) in edited {
        if READ_ONLY_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let old_value = original.get(key).unwrap_or(&Value::Null);
        if old_value != new_value {
            changes.insert(key.clone(), new_value.clone());
        }
    }
    for key in original.keys() {
        if READ_ONLY_FIELDS.contains(&key.as_str()) || edited.contains_key(key) {
            continue;
        }
        if !original[key].is_null() {
            changes.insert(key.clone(), Value::Null);
        }
    }
    changes
}
