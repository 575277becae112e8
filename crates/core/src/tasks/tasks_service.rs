use std::sync::Arc;

use log::info;

use super::task_mutations::SetTaskStatus;
use super::tasks_model::{NewTask, Task, TaskFilter, TaskStatus};
use super::tasks_traits::{TaskRepositoryTrait, TaskServiceTrait};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::mutation::MutationCoordinator;
use crate::state::{Action, RecordKey, Store};

/// Service for lead follow-up tasks.
pub struct TaskService {
    repository: Arc<dyn TaskRepositoryTrait>,
    coordinator: Arc<MutationCoordinator>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl TaskService {
    pub fn new(
        repository: Arc<dyn TaskRepositoryTrait>,
        coordinator: Arc<MutationCoordinator>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            coordinator,
            event_sink,
        }
    }

    fn store(&self) -> &Store {
        self.coordinator.store()
    }
}

#[async_trait::async_trait]
impl TaskServiceTrait for TaskService {
    async fn get_task(&self, task_id: &str) -> Result<Task> {
        self.store()
            .track_fetch(
                RecordKey::Task(task_id.to_string()),
                self.repository.get_by_id(task_id),
                |task| Action::TasksLoaded(vec![task.clone()]),
            )
            .await
    }

    async fn create_task(&self, new_task: NewTask) -> Result<Task> {
        new_task.validate()?;
        let task = self.repository.create(&new_task).await?;
        self.store().dispatch(Action::TasksLoaded(vec![task.clone()]));
        info!("Created task {}", task.task_id);
        self.event_sink.emit(DomainEvent::TaskCreated {
            task_id: task.task_id.clone(),
        });
        Ok(task)
    }

    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>> {
        let tasks = self.repository.list(&filter).await?;
        self.store().dispatch(Action::TasksLoaded(tasks.clone()));
        Ok(tasks)
    }

    async fn set_status(&self, task_id: &str, status: TaskStatus) -> Result<Task> {
        if self.store().task(task_id).is_none() {
            self.get_task(task_id).await?;
        }
        let mutation = SetTaskStatus::new(self.repository.clone(), task_id, status);
        self.coordinator.execute(mutation).await?;
        self.store()
            .task(task_id)
            .ok_or_else(|| Error::NotFound(format!("Task {}", task_id)))
    }
}
