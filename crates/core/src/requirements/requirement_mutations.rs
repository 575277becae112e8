//! Optimistic mutations on buyer requirements.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::requirements_model::{InternalStatus, Requirement, RequirementStatus};
use super::requirements_traits::RequirementRepositoryTrait;
use crate::errors::{Error, Result, ValidationError};
use crate::events::DomainEvent;
use crate::mutation::{OptimisticMutation, UndoLog};
use crate::notes::{NewNote, Note};
use crate::state::{Action, ListEdit, RequirementPatch, Store, StoreState};

fn cached<'a>(state: &'a StoreState, requirement_id: &str) -> Result<&'a Requirement> {
    state
        .requirements
        .get(requirement_id)
        .ok_or_else(|| Error::NotFound(format!("Requirement {}", requirement_id)))
}

fn patch(requirement_id: &str, patch: RequirementPatch) -> Action {
    Action::RequirementPatched {
        requirement_id: requirement_id.to_string(),
        patch,
    }
}

/// One of the two status dropdowns on a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementStatusUpdate {
    Status(RequirementStatus),
    Internal(InternalStatus),
}

impl RequirementStatusUpdate {
    fn field(&self) -> &'static str {
        match self {
            RequirementStatusUpdate::Status(_) => "requirementStatus",
            RequirementStatusUpdate::Internal(_) => "internalStatus",
        }
    }

    /// Current value of the same field on `requirement`.
    fn read(&self, requirement: &Requirement) -> Self {
        match self {
            RequirementStatusUpdate::Status(_) => {
                RequirementStatusUpdate::Status(requirement.requirement_status)
            }
            RequirementStatusUpdate::Internal(_) => {
                RequirementStatusUpdate::Internal(requirement.internal_status)
            }
        }
    }

    fn to_patch(self) -> RequirementPatch {
        match self {
            RequirementStatusUpdate::Status(status) => RequirementPatch {
                requirement_status: Some(status),
                ..Default::default()
            },
            RequirementStatusUpdate::Internal(status) => RequirementPatch {
                internal_status: Some(status),
                ..Default::default()
            },
        }
    }
}

/// Sets the requirement status or the internal status.
pub struct SetRequirementStatus {
    repository: Arc<dyn RequirementRepositoryTrait>,
    requirement_id: String,
    update: RequirementStatusUpdate,
    undo: UndoLog,
}

impl SetRequirementStatus {
    pub fn new(
        repository: Arc<dyn RequirementRepositoryTrait>,
        requirement_id: impl Into<String>,
        update: RequirementStatusUpdate,
    ) -> Self {
        Self {
            repository,
            requirement_id: requirement_id.into(),
            update,
            undo: UndoLog::new(),
        }
    }
}

#[async_trait]
impl OptimisticMutation for SetRequirementStatus {
    type Output = Requirement;

    fn label(&self) -> String {
        format!("requirement {} {}", self.requirement_id, self.update.field())
    }

    fn validate(&self, state: &StoreState) -> Result<()> {
        cached(state, &self.requirement_id).map(|_| ())
    }

    fn apply_local(&mut self, store: &Store) -> Result<()> {
        let id = self.requirement_id.clone();
        let update = self.update;
        let previous = store.transact(|state| match cached(state, &id) {
            Ok(requirement) => (
                vec![patch(&id, update.to_patch())],
                Ok(update.read(requirement)),
            ),
            Err(e) => (Vec::new(), Err(e)),
        })?;

        let guard_id = id.clone();
        self.undo.record_guarded(
            move |state| {
                state
                    .requirements
                    .get(&guard_id)
                    .is_some_and(|r| update.read(r) == update)
            },
            vec![patch(&id, previous.to_patch())],
        );
        Ok(())
    }

    async fn commit_remote(&self) -> Result<Requirement> {
        match self.update {
            RequirementStatusUpdate::Status(status) => {
                self.repository
                    .update_status(&self.requirement_id, status)
                    .await
            }
            RequirementStatusUpdate::Internal(status) => {
                self.repository
                    .update_internal_status(&self.requirement_id, status)
                    .await
            }
        }
    }

    fn confirm_local(&mut self, store: &Store, output: &Requirement) {
        let id = self.requirement_id.clone();
        let optimistic = self.update;
        let confirmed = optimistic.read(output);
        store.transact(|state| {
            let still_ours = state
                .requirements
                .get(&id)
                .is_some_and(|r| optimistic.read(r) == optimistic);
            let actions = if still_ours && confirmed != optimistic {
                vec![patch(&id, confirmed.to_patch())]
            } else {
                Vec::new()
            };
            (actions, ())
        });
    }

    fn undo_log(&mut self) -> &mut UndoLog {
        &mut self.undo
    }

    fn confirmed_event(&self, _output: &Requirement) -> Option<DomainEvent> {
        Some(DomainEvent::requirement_changed(
            &self.requirement_id,
            &[self.update.field()],
        ))
    }
}

/// Appends a note to a requirement.
pub struct AddRequirementNote {
    repository: Arc<dyn RequirementRepositoryTrait>,
    requirement_id: String,
    note: NewNote,
    temp_note_id: Option<String>,
    undo: UndoLog,
}

impl AddRequirementNote {
    pub fn new(
        repository: Arc<dyn RequirementRepositoryTrait>,
        requirement_id: impl Into<String>,
        note: NewNote,
    ) -> Self {
        Self {
            repository,
            requirement_id: requirement_id.into(),
            note,
            temp_note_id: None,
            undo: UndoLog::new(),
        }
    }
}

#[async_trait]
impl OptimisticMutation for AddRequirementNote {
    type Output = Note;

    fn label(&self) -> String {
        format!("requirement {} note", self.requirement_id)
    }

    fn validate(&self, state: &StoreState) -> Result<()> {
        self.note.validate()?;
        cached(state, &self.requirement_id).map(|_| ())
    }

    fn apply_local(&mut self, store: &Store) -> Result<()> {
        let pending = self.note.to_pending_note(Utc::now());
        let temp_id = pending.id.clone();
        store.dispatch(patch(
            &self.requirement_id,
            RequirementPatch {
                notes: Some(ListEdit::push(pending)),
                ..Default::default()
            },
        ));
        self.undo.record(vec![patch(
            &self.requirement_id,
            RequirementPatch {
                notes: Some(ListEdit::remove(temp_id.clone())),
                ..Default::default()
            },
        )]);
        self.temp_note_id = Some(temp_id);
        Ok(())
    }

    async fn commit_remote(&self) -> Result<Note> {
        self.repository
            .append_note(&self.requirement_id, &self.note)
            .await
    }

    fn confirm_local(&mut self, store: &Store, output: &Note) {
        if let Some(temp_id) = self.temp_note_id.take() {
            store.dispatch(patch(
                &self.requirement_id,
                RequirementPatch {
                    notes: Some(ListEdit::replace(temp_id, output.clone())),
                    ..Default::default()
                },
            ));
        }
    }

    fn undo_log(&mut self) -> &mut UndoLog {
        &mut self.undo
    }

    fn confirmed_event(&self, _output: &Note) -> Option<DomainEvent> {
        Some(DomainEvent::requirement_changed(
            &self.requirement_id,
            &["notes"],
        ))
    }
}

/// Links a property to, or unlinks it from, a requirement.
pub struct ChangeMatchingProperty {
    repository: Arc<dyn RequirementRepositoryTrait>,
    requirement_id: String,
    property_id: String,
    link: bool,
    undo: UndoLog,
}

impl ChangeMatchingProperty {
    pub fn link(
        repository: Arc<dyn RequirementRepositoryTrait>,
        requirement_id: impl Into<String>,
        property_id: impl Into<String>,
    ) -> Self {
        Self::new(repository, requirement_id.into(), property_id.into(), true)
    }

    pub fn unlink(
        repository: Arc<dyn RequirementRepositoryTrait>,
        requirement_id: impl Into<String>,
        property_id: impl Into<String>,
    ) -> Self {
        Self::new(repository, requirement_id.into(), property_id.into(), false)
    }

    fn new(
        repository: Arc<dyn RequirementRepositoryTrait>,
        requirement_id: String,
        property_id: String,
        link: bool,
    ) -> Self {
        Self {
            repository,
            requirement_id,
            property_id: property_id.trim().to_string(),
            link,
            undo: UndoLog::new(),
        }
    }
}

#[async_trait]
impl OptimisticMutation for ChangeMatchingProperty {
    type Output = ();

    fn label(&self) -> String {
        let verb = if self.link { "link" } else { "unlink" };
        format!(
            "requirement {} {} property {}",
            self.requirement_id, verb, self.property_id
        )
    }

    fn validate(&self, state: &StoreState) -> Result<()> {
        if self.property_id.is_empty() {
            return Err(ValidationError::missing("propertyId").into());
        }
        cached(state, &self.requirement_id).map(|_| ())
    }

    fn apply_local(&mut self, store: &Store) -> Result<()> {
        let id = self.requirement_id.clone();
        let property_id = self.property_id.clone();
        let link = self.link;
        let undo = store.transact(|state| {
            let requirement = match cached(state, &id) {
                Ok(r) => r,
                Err(e) => return (Vec::new(), Err(e)),
            };
            let position = requirement
                .matching_properties
                .iter()
                .position(|p| *p == property_id);
            let (edit, undo) = match (link, position) {
                // Nothing to change locally; the remote write still runs.
                (true, Some(_)) | (false, None) => return (Vec::new(), Ok(None)),
                (true, None) => (
                    ListEdit::push(property_id.clone()),
                    ListEdit::remove(property_id.clone()),
                ),
                (false, Some(index)) => (
                    ListEdit::remove(property_id.clone()),
                    ListEdit::Insert {
                        index,
                        item: property_id.clone(),
                    },
                ),
            };
            let apply = patch(
                &id,
                RequirementPatch {
                    matching_properties: Some(edit),
                    ..Default::default()
                },
            );
            (vec![apply], Ok(Some(undo)))
        })?;

        if let Some(undo) = undo {
            self.undo.record(vec![patch(
                &id,
                RequirementPatch {
                    matching_properties: Some(undo),
                    ..Default::default()
                },
            )]);
        }
        Ok(())
    }

    async fn commit_remote(&self) -> Result<()> {
        if self.link {
            self.repository
                .add_matching_property(&self.requirement_id, &self.property_id)
                .await
        } else {
            self.repository
                .remove_matching_property(&self.requirement_id, &self.property_id)
                .await
        }
    }

    fn undo_log(&mut self) -> &mut UndoLog {
        &mut self.undo
    }

    fn confirmed_event(&self, _output: &()) -> Option<DomainEvent> {
        Some(DomainEvent::requirement_changed(
            &self.requirement_id,
            &["matchingProperties"],
        ))
    }
}
