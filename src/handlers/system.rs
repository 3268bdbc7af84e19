use axum::Json;

use crate::system::SystemInfo;

pub async fn system_data() -> Json<SystemInfo> {
    Json(SystemInfo::gather().await)
}
