use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use super::AppState;
use crate::config::DeviceTarget;

pub async fn save_config(
    State(state): State<AppState>,
    Json(target): Json<DeviceTarget>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if !target.is_complete() {
        return Err((
            StatusCode::BAD_REQUEST,
            "ip and community are required".to_string(),
        ));
    }

    state.config.store.save(&target).map_err(|e| {
        let reason = format!("{:#}", e);
        tracing::error!(error = %reason, "не удалось сохранить конфигурацию устройства");
        (StatusCode::INTERNAL_SERVER_ERROR, reason)
    })?;

    Ok(Json(json!({ "saved": true, "ip": target.ip })))
}
