use std::sync::Arc;

use crate::{api::shared::run_detached, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use propdesk_core::{
    notes::NewNote,
    properties::Property,
    requirements::{InternalStatus, NewRequirement, Requirement, RequirementStatus},
    search::{SearchPage, SearchRequest},
};
use serde::Deserialize;

#[derive(Deserialize)]
struct StatusBody {
    status: RequirementStatus,
}

#[derive(Deserialize)]
struct InternalStatusBody {
    status: InternalStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkBody {
    property_id: String,
}

async fn create_requirement(
    State(state): State<Arc<AppState>>,
    Json(new_requirement): Json<NewRequirement>,
) -> ApiResult<(StatusCode, Json<Requirement>)> {
    let service = state.requirement_service.clone();
    let requirement =
        run_detached(async move { service.create_requirement(new_requirement).await }).await?;
    Ok((StatusCode::CREATED, Json(requirement)))
}

async fn get_requirement(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Requirement>> {
    let requirement = state.requirement_service.get_requirement(&id).await?;
    Ok(Json(requirement))
}

async fn search_requirements(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchPage<Requirement>>> {
    let page = state.requirement_service.search_requirements(request).await?;
    Ok(Json(page))
}

async fn update_status(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<Requirement>> {
    let service = state.requirement_service.clone();
    let requirement =
        run_detached(async move { service.update_status(&id, body.status).await }).await?;
    Ok(Json(requirement))
}

async fn update_internal_status(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<InternalStatusBody>,
) -> ApiResult<Json<Requirement>> {
    let service = state.requirement_service.clone();
    let requirement =
        run_detached(async move { service.update_internal_status(&id, body.status).await })
            .await?;
    Ok(Json(requirement))
}

async fn add_note(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(note): Json<NewNote>,
) -> ApiResult<Json<Requirement>> {
    let service = state.requirement_service.clone();
    let requirement = run_detached(async move { service.add_note(&id, note).await }).await?;
    Ok(Json(requirement))
}

async fn link_property(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<LinkBody>,
) -> ApiResult<Json<Requirement>> {
    let service = state.requirement_service.clone();
    let requirement = run_detached(async move {
        service.add_matching_property(&id, &body.property_id).await
    })
    .await?;
    Ok(Json(requirement))
}

async fn unlink_property(
    Path((id, property_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Requirement>> {
    let service = state.requirement_service.clone();
    let requirement = run_detached(async move {
        service.remove_matching_property(&id, &property_id).await
    })
    .await?;
    Ok(Json(requirement))
}

async fn matching_properties(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Property>>> {
    let properties = state.requirement_service.matching_properties(&id).await?;
    Ok(Json(properties))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/requirements", post(create_requirement))
        .route("/requirements/search", post(search_requirements))
        .route("/requirements/{id}", get(get_requirement))
        .route("/requirements/{id}/status", put(update_status))
        .route("/requirements/{id}/internal-status", put(update_internal_status))
        .route("/requirements/{id}/notes", post(add_note))
        .route(
            "/requirements/{id}/matching-properties",
            get(matching_properties).post(link_property),
        )
        .route(
            "/requirements/{id}/matching-properties/{property_id}",
            delete(unlink_property),
        )
}
