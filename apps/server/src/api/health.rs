use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheStatus {
    in_flight_mutations: usize,
    properties: usize,
    requirements: usize,
    projects: usize,
    tasks: usize,
    builder_names: usize,
}

/// Size of the local cache and number of pending remote writes.
async fn cache_status(State(state): State<Arc<AppState>>) -> Json<CacheStatus> {
    let in_flight_mutations = state.coordinator.in_flight();
    let status = state.store.read(|s| CacheStatus {
        in_flight_mutations,
        properties: s.properties.len(),
        requirements: s.requirements.len(),
        projects: s.projects.len(),
        tasks: s.tasks.len(),
        builder_names: s.builder_names.len(),
    });
    Json(status)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", get(cache_status))
}
