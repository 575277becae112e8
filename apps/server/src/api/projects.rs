use std::sync::Arc;

use crate::{api::shared::run_detached, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use propdesk_core::{
    projects::{Project, ProjectDraft, ProjectStage, ProjectSummary},
    search::{SearchPage, SearchRequest},
};
use serde::Deserialize;

#[derive(Deserialize)]
struct ListQuery {
    micromarket: Option<String>,
}

async fn list_projects(
    Path(stage): Path<String>,
    Query(query): Query<ListQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Project>>> {
    let stage: ProjectStage = stage.parse()?;
    let projects = state
        .project_service
        .list_projects(stage, query.micromarket.as_deref())
        .await?;
    Ok(Json(projects))
}

async fn get_project(
    Path((stage, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Project>> {
    let stage: ProjectStage = stage.parse()?;
    let project = state.project_service.get_project(stage, &id).await?;
    Ok(Json(project))
}

async fn get_project_summary(
    Path((stage, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ProjectSummary>> {
    let stage: ProjectStage = stage.parse()?;
    let project = match state.project_service.cached_project(stage, &id) {
        Some(project) => project,
        None => state.project_service.get_project(stage, &id).await?,
    };
    Ok(Json(ProjectSummary::from(&project)))
}

/// Saves an edited copy of the project; only changed fields are written.
async fn submit_project(
    Path((stage, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(edited): Json<Project>,
) -> ApiResult<Json<Project>> {
    let stage: ProjectStage = stage.parse()?;
    let service = state.project_service.clone();
    let project = run_detached(async move {
        let draft = service.begin_edit(stage, &id).await?;
        let draft = ProjectDraft::with_edits(draft.original().clone(), edited);
        service.submit_edit(draft).await
    })
    .await?;
    Ok(Json(project))
}

async fn search_projects(
    Path(stage): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchPage<Project>>> {
    let stage: ProjectStage = stage.parse()?;
    let page = state.project_service.search_projects(stage, request).await?;
    Ok(Json(page))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/projects/{stage}", get(list_projects))
        .route("/projects/{stage}/search", post(search_projects))
        .route(
            "/projects/{stage}/{id}",
            get(get_project).put(submit_project),
        )
        .route("/projects/{stage}/{id}/summary", get(get_project_summary))
}
