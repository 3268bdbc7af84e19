use axum::{Json, extract::State};

use super::AppState;
use crate::catalog::CatalogInfo;

pub async fn mib_info(State(state): State<AppState>) -> Json<CatalogInfo> {
    Json(state.collector.catalog().introspect())
}
