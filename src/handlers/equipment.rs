use axum::{Json, extract::State};

use super::AppState;
use crate::collector::Snapshot;
use crate::formatter::JsonFormatter;
use crate::formatter::json::EquipmentDataJson;

/// Один цикл опроса на запрос. Если клиент отвалился, future дропается
/// и незаконченный snapshot никуда не попадает.
pub async fn equipment_data(State(state): State<AppState>) -> Json<EquipmentDataJson> {
    let snapshot = match state.config.get_target() {
        Ok(target) => {
            let mut client = state.client.lock().await;
            state.collector.collect(target.as_ref(), &mut *client).await
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            tracing::warn!(error = %reason, "не удалось прочитать конфигурацию устройства");
            Snapshot::not_configured(format!("failed to load device configuration: {}", reason))
        }
    };

    Json(JsonFormatter::format_snapshot(&snapshot))
}
