use std::future::Future;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};

use super::reducer::reduce;
use super::state_model::{Action, FetchStatus, RecordKey, StoreState};
use crate::errors::Result;
use crate::projects::{Project, ProjectStage};
use crate::properties::Property;
use crate::requirements::Requirement;
use crate::tasks::Task;

/// Owner of the application state.
///
/// Constructed once at startup and shared by reference. Writes are
/// serialized: each [`Store::dispatch`] holds the write lock for the duration
/// of one reducer pass, so actions are applied strictly in dispatch order.
#[derive(Debug, Default)]
pub struct Store {
    state: RwLock<StoreState>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a single action.
    pub fn dispatch(&self, action: Action) {
        debug!("dispatch {}", action_name(&action));
        reduce(&mut self.write(), action);
    }

    /// Applies several actions under one lock, in order.
    pub fn dispatch_all(&self, actions: Vec<Action>) {
        let mut state = self.write();
        for action in actions {
            debug!("dispatch {}", action_name(&action));
            reduce(&mut state, action);
        }
    }

    /// Computes actions from the current state and applies them atomically.
    ///
    /// `f` sees the state under the write lock; no other dispatch can land
    /// between the read and the returned actions.
    pub fn transact<R>(&self, f: impl FnOnce(&StoreState) -> (Vec<Action>, R)) -> R {
        let mut state = self.write();
        let (actions, result) = f(&state);
        for action in actions {
            debug!("dispatch {}", action_name(&action));
            reduce(&mut state, action);
        }
        result
    }

    /// Runs `f` against a consistent view of the state.
    pub fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&self.state_guard())
    }

    /// Clones the full state.
    pub fn snapshot(&self) -> StoreState {
        self.state_guard().clone()
    }

    pub fn property(&self, property_id: &str) -> Option<Property> {
        self.read(|s| s.properties.get(property_id).cloned())
    }

    pub fn requirement(&self, requirement_id: &str) -> Option<Requirement> {
        self.read(|s| s.requirements.get(requirement_id).cloned())
    }

    pub fn project(&self, stage: ProjectStage, project_id: &str) -> Option<Project> {
        self.read(|s| s.projects.get(&(stage, project_id.to_string())).cloned())
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.read(|s| s.tasks.get(task_id).cloned())
    }

    pub fn builder_names(&self) -> Vec<String> {
        self.read(|s| s.builder_names.iter().cloned().collect())
    }

    pub fn fetch_status(&self, key: &RecordKey) -> Option<FetchStatus> {
        self.read(|s| s.fetch_status(key).cloned())
    }

    /// Runs a remote fetch while tracking its [`FetchStatus`] under `key`.
    ///
    /// On success the record is cached through the action built by `loaded`;
    /// on failure the key is marked failed so the view can offer a retry.
    pub async fn track_fetch<T, F>(
        &self,
        key: RecordKey,
        fetch: F,
        loaded: impl FnOnce(&T) -> Action,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.dispatch(Action::FetchStarted(key.clone()));
        match fetch.await {
            Ok(record) => {
                self.dispatch(loaded(&record));
                Ok(record)
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", key, e);
                self.dispatch(Action::FetchFailed {
                    key,
                    message: e.user_message(),
                });
                Err(e)
            }
        }
    }

    /// Drops all cached records.
    pub fn reset(&self) {
        self.dispatch(Action::Reset);
    }

    fn state_guard(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::FetchStarted(_) => "FetchStarted",
        Action::FetchFailed { .. } => "FetchFailed",
        Action::PropertiesLoaded(_) => "PropertiesLoaded",
        Action::PropertyPatched { .. } => "PropertyPatched",
        Action::RequirementsLoaded(_) => "RequirementsLoaded",
        Action::RequirementPatched { .. } => "RequirementPatched",
        Action::ProjectsLoaded(_) => "ProjectsLoaded",
        Action::ProjectFieldsPatched { .. } => "ProjectFieldsPatched",
        Action::TasksLoaded(_) => "TasksLoaded",
        Action::TaskPatched { .. } => "TaskPatched",
        Action::BuilderNamesLoaded(_) => "BuilderNamesLoaded",
        Action::BuilderNameAdded(_) => "BuilderNameAdded",
        Action::Reset => "Reset",
    }
}
