use std::sync::Arc;

use async_trait::async_trait;

use super::tasks_model::{Task, TaskStatus};
use super::tasks_traits::TaskRepositoryTrait;
use crate::errors::{Error, Result};
use crate::events::DomainEvent;
use crate::mutation::{OptimisticMutation, UndoLog};
use crate::state::{Action, Store, StoreState, TaskPatch};

fn status_patch(task_id: &str, status: TaskStatus) -> Action {
    Action::TaskPatched {
        task_id: task_id.to_string(),
        patch: TaskPatch {
            status: Some(status),
        },
    }
}

/// Marks a task open or done.
pub struct SetTaskStatus {
    repository: Arc<dyn TaskRepositoryTrait>,
    task_id: String,
    status: TaskStatus,
    undo: UndoLog,
}

impl SetTaskStatus {
    pub fn new(
        repository: Arc<dyn TaskRepositoryTrait>,
        task_id: impl Into<String>,
        status: TaskStatus,
    ) -> Self {
        Self {
            repository,
            task_id: task_id.into(),
            status,
            undo: UndoLog::new(),
        }
    }
}

#[async_trait]
impl OptimisticMutation for SetTaskStatus {
    type Output = Task;

    fn label(&self) -> String {
        format!("task {} status", self.task_id)
    }

    fn validate(&self, state: &StoreState) -> Result<()> {
        if !state.tasks.contains_key(&self.task_id) {
            return Err(Error::NotFound(format!("Task {}", self.task_id)));
        }
        Ok(())
    }

    fn apply_local(&mut self, store: &Store) -> Result<()> {
        let id = self.task_id.clone();
        let status = self.status;
        let previous = store.transact(|state| match state.tasks.get(&id) {
            Some(task) => (vec![status_patch(&id, status)], Ok(task.status)),
            None => (
                Vec::new(),
                Err(Error::NotFound(format!("Task {}", id))),
            ),
        })?;

        let guard_id = id.clone();
        self.undo.record_guarded(
            move |state| state.tasks.get(&guard_id).is_some_and(|t| t.status == status),
            vec![status_patch(&id, previous)],
        );
        Ok(())
    }

    async fn commit_remote(&self) -> Result<Task> {
        self.repository
            .update_status(&self.task_id, self.status)
            .await
    }

    fn confirm_local(&mut self, store: &Store, output: &Task) {
        let optimistic = self.status;
        if output.status == optimistic {
            return;
        }
        let id = self.task_id.clone();
        store.transact(|state| {
            let still_ours = state
                .tasks
                .get(&id)
                .is_some_and(|t| t.status == optimistic);
            let actions = if still_ours {
                vec![status_patch(&id, output.status)]
            } else {
                Vec::new()
            };
            (actions, ())
        });
    }

    fn undo_log(&mut self) -> &mut UndoLog {
        &mut self.undo
    }

    fn confirmed_event(&self, _output: &Task) -> Option<DomainEvent> {
        Some(DomainEvent::TaskChanged {
            task_id: self.task_id.clone(),
        })
    }
}
