//! Tasks module - lead follow-up tasks.

mod task_mutations;
mod tasks_model;
mod tasks_service;
mod tasks_traits;


pub use task_mutations::SetTaskStatus;
pub use tasks_model::{NewTask, Task, TaskFilter, TaskStatus};
pub use tasks_service::TaskService;
pub use tasks_traits::{TaskRepositoryTrait, TaskServiceTrait};
