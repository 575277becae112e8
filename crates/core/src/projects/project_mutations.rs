use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use serde_json::{Map, Value};

use super::project_draft::ProjectDraft;
use super::projects_model::{Project, ProjectStage};
use super::projects_traits::ProjectRepositoryTrait;
use crate::errors::{Error, Result};
use crate::events::DomainEvent;
use crate::mutation::{OptimisticMutation, UndoLog};
use crate::state::{Action, Store, StoreState};

/// Wire value of one top-level field; absent fields read as `null`.
fn field_value(project: &Project, field: &str) -> Value {
    match serde_json::to_value(project) {
        Ok(Value::Object(mut map)) => map.remove(field).unwrap_or(Value::Null),
        Ok(_) => Value::Null,
        Err(e) => {
            warn!("Failed to encode project {}: {}", project.project_id, e);
            Value::Null
        }
    }
}

fn patch(stage: ProjectStage, project_id: &str, fields: Map<String, Value>) -> Action {
    Action::ProjectFieldsPatched {
        stage,
        project_id: project_id.to_string(),
        fields,
    }
}

/// Saves the changed fields of a project draft.
pub struct SubmitProjectEdit {
    repository: Arc<dyn ProjectRepositoryTrait>,
    stage: ProjectStage,
    project_id: String,
    edited: Project,
    changes: Map<String, Value>,
    originals: Map<String, Value>,
    undo: UndoLog,
}

impl SubmitProjectEdit {
    pub fn new(repository: Arc<dyn ProjectRepositoryTrait>, draft: &ProjectDraft) -> Result<Self> {
        let changes = draft.changes()?;
        let originals = draft.original_values(&changes)?;
        let original = draft.original();
        Ok(Self {
            repository,
            stage: original.stage,
            project_id: original.project_id.clone(),
            edited: draft.edited().clone(),
            changes,
            originals,
            undo: UndoLog::new(),
        })
    }

    /// Wire names of the fields this edit writes.
    pub fn changed_fields(&self) -> Vec<&str> {
        self.changes.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[async_trait]
impl OptimisticMutation for SubmitProjectEdit {
    type Output = Project;

    fn label(&self) -> String {
        format!("{} project {}", self.stage, self.project_id)
    }

    fn validate(&self, state: &StoreState) -> Result<()> {
        if !state
            .projects
            .contains_key(&(self.stage, self.project_id.clone()))
        {
            return Err(Error::NotFound(format!(
                "{} project {}",
                self.stage, self.project_id
            )));
        }
        self.edited.validate()
    }

    fn apply_local(&mut self, store: &Store) -> Result<()> {
        store.dispatch(patch(self.stage, &self.project_id, self.changes.clone()));

        // One step per field, so a field rewritten by a later edit keeps its value.
        for (field, edited_value) in &self.changes {
            let original = self.originals.get(field).cloned().unwrap_or(Value::Null);
            let key = (self.stage, self.project_id.clone());
            let guard_field = field.clone();
            let expected = edited_value.clone();
            self.undo.record_guarded(
                move |state| {
                    state
                        .projects
                        .get(&key)
                        .is_some_and(|p| field_value(p, &guard_field) == expected)
                },
                vec![patch(
                    self.stage,
                    &self.project_id,
                    Map::from_iter([(field.clone(), original)]),
                )],
            );
        }
        Ok(())
    }

    async fn commit_remote(&self) -> Result<Project> {
        self.repository
            .update_fields(self.stage, &self.project_id, &self.changes)
            .await
    }

    fn confirm_local(&mut self, store: &Store, output: &Project) {
        let key = (self.stage, self.project_id.clone());
        let changes = &self.changes;
        store.transact(|state| {
            let Some(local) = state.projects.get(&key) else {
                return (Vec::new(), ());
            };
            let mut fields = Map::new();
            for (field, optimistic) in changes {
                if field_value(local, field) == *optimistic {
                    fields.insert(field.clone(), field_value(output, field));
                }
            }
            fields.insert("updatedAt".to_string(), field_value(output, "updatedAt"));
            (vec![patch(key.0, &key.1, fields)], ())
        });
    }

    fn undo_log(&mut self) -> &mut UndoLog {
        &mut self.undo
    }

    fn confirmed_event(&self, _output: &Project) -> Option<DomainEvent> {
        Some(DomainEvent::ProjectUpdated {
            stage: self.stage,
            project_id: self.project_id.clone(),
            fields: self.changes.keys().cloned().collect(),
        })
    }
}
