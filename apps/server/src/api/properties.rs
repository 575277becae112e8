use std::sync::Arc;

use crate::{api::shared::run_detached, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use propdesk_core::{
    notes::NewNote,
    properties::{PriceChange, Property, PropertyStatus, PropertySummary},
    search::{SearchPage, SearchRequest},
};
use serde::Deserialize;

#[derive(Deserialize)]
struct StatusBody {
    status: PropertyStatus,
}

async fn get_property(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Property>> {
    let property = state.property_service.get_property(&id).await?;
    Ok(Json(property))
}

async fn get_property_summary(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PropertySummary>> {
    let property = match state.property_service.cached_property(&id) {
        Some(property) => property,
        None => state.property_service.get_property(&id).await?,
    };
    Ok(Json(PropertySummary::from(&property)))
}

async fn search_properties(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchPage<Property>>> {
    let page = state.property_service.search_properties(request).await?;
    Ok(Json(page))
}

async fn update_status(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<Property>> {
    let service = state.property_service.clone();
    let property =
        run_detached(async move { service.update_status(&id, body.status).await }).await?;
    Ok(Json(property))
}

async fn change_price(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(change): Json<PriceChange>,
) -> ApiResult<Json<Property>> {
    let service = state.property_service.clone();
    let property = run_detached(async move { service.change_price(&id, change).await }).await?;
    Ok(Json(property))
}

async fn add_note(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(note): Json<NewNote>,
) -> ApiResult<Json<Property>> {
    let service = state.property_service.clone();
    let property = run_detached(async move { service.add_note(&id, note).await }).await?;
    Ok(Json(property))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/properties/search", post(search_properties))
        .route("/properties/{id}", get(get_property))
        .route("/properties/{id}/summary", get(get_property_summary))
        .route("/properties/{id}/status", put(update_status))
        .route("/properties/{id}/price", post(change_price))
        .route("/properties/{id}/notes", post(add_note))
}
