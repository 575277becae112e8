use std::sync::Arc;

use crate::{api::shared::run_detached, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use propdesk_core::tasks::{NewTask, Task, TaskFilter, TaskStatus};
use serde::Deserialize;

#[derive(Deserialize)]
struct StatusBody {
    status: TaskStatus,
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(new_task): Json<NewTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let service = state.task_service.clone();
    let task = run_detached(async move { service.create_task(new_task).await }).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn list_tasks(
    Query(filter): Query<TaskFilter>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.task_service.list_tasks(filter).await?;
    Ok(Json(tasks))
}

async fn get_task(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Task>> {
    let task = state.task_service.get_task(&id).await?;
    Ok(Json(task))
}

async fn set_status(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<Task>> {
    let service = state.task_service.clone();
    let task = run_detached(async move { service.set_status(&id, body.status).await }).await?;
    Ok(Json(task))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task))
        .route("/tasks/{id}/status", put(set_status))
}
