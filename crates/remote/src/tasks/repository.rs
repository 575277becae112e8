use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use propdesk_core::constants::TASKS_COLLECTION;
use propdesk_core::tasks::{NewTask, Task, TaskFilter, TaskRepositoryTrait, TaskStatus};
use propdesk_core::Result;
use serde_json::Map;

use crate::document::{encode_fields, DocumentStore, FieldFilter, ListQuery};
use crate::utils::to_value;

const ID_FIELD: &str = "taskId";

pub struct TaskRepository {
    store: Arc<dyn DocumentStore>,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

fn filter_query(filter: &TaskFilter) -> Result<ListQuery> {
    let mut query = ListQuery::all();
    if let Some(assignee) = &filter.assignee {
        query = query.filter(FieldFilter::equals("assignee", assignee.as_str()));
    }
    if let Some(status) = &filter.status {
        query = query.filter(FieldFilter::equals("status", to_value(status)?));
    }
    if let Some(requirement_id) = &filter.requirement_id {
        query = query.filter(FieldFilter::equals("requirementId", requirement_id.as_str()));
    }
    Ok(query)
}

#[async_trait]
impl TaskRepositoryTrait for TaskRepository {
    async fn get_by_id(&self, task_id: &str) -> Result<Task> {
        self.store.get(TASKS_COLLECTION, task_id).await?.decode(ID_FIELD)
    }

    async fn create(&self, new_task: &NewTask) -> Result<Task> {
        let record = Task {
            task_id: String::new(),
            title: new_task.title.trim().to_string(),
            assignee: new_task.assignee.clone(),
            requirement_id: new_task.requirement_id.clone(),
            property_id: new_task.property_id.clone(),
            due_date: new_task.due_date,
            status: TaskStatus::Open,
            created_at: Some(Utc::now()),
        };
        let fields = encode_fields(&record, ID_FIELD)?;
        self.store
            .create(TASKS_COLLECTION, None, fields)
            .await?
            .decode(ID_FIELD)
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.store
            .list(TASKS_COLLECTION, &filter_query(filter)?)
            .await?
            .into_iter()
            .map(|document| document.decode(ID_FIELD))
            .collect()
    }

    async fn update_status(&self, task_id: &str, status: TaskStatus) -> Result<Task> {
        let mut fields = Map::new();
        fields.insert("status".to_string(), to_value(&status)?);
        self.store
            .merge(TASKS_COLLECTION, task_id, fields)
            .await?
            .decode(ID_FIELD)
    }
}
