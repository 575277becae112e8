use async_trait::async_trait;

use super::tasks_model::{NewTask, Task, TaskFilter, TaskStatus};
use crate::errors::Result;

#[async_trait]
pub trait TaskRepositoryTrait: Send + Sync {
    async fn get_by_id(&self, task_id: &str) -> Result<Task>;

    async fn create(&self, new_task: &NewTask) -> Result<Task>;

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    async fn update_status(&self, task_id: &str, status: TaskStatus) -> Result<Task>;
}

#[async_trait]
pub trait TaskServiceTrait: Send + Sync {
    async fn get_task(&self, task_id: &str) -> Result<Task>;

    async fn create_task(&self, new_task: NewTask) -> Result<Task>;

    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>>;

    async fn set_status(&self, task_id: &str, status: TaskStatus) -> Result<Task>;
}
