use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::get, Json, Router};

async fn list_builders(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    let names = state.builder_service.list_names().await?;
    Ok(Json(names))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/builders", get(list_builders))
}
