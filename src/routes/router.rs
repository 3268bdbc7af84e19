use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{AppState, equipment_data, health, mib_info, save_config, system_data};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/equipment-data", get(equipment_data))
        .route("/api/mib-info", get(mib_info))
        .route("/api/system-data", get(system_data))
        .route("/api/config", post(save_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
