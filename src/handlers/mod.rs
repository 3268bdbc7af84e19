use std::sync::Arc;
use tokio::sync::Mutex;

use crate::collector::Collector;
use crate::config::AppConfig;
use crate::snmp::SnmpFetcher;

pub mod catalog;
pub mod config;
pub mod equipment;
pub mod health;
pub mod system;

pub use catalog::mib_info;
pub use config::save_config;
pub use equipment::equipment_data;
pub use health::health;
pub use system::system_data;

/// Общее состояние HTTP слоя
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub collector: Collector,
    /// Один SNMP канал на процесс: циклы опроса не пересекаются
    pub client: Arc<Mutex<SnmpFetcher>>,
}

impl AppState {
    pub fn new(config: AppConfig, collector: Collector, client: SnmpFetcher) -> Self {
        Self {
            config: Arc::new(config),
            collector,
            client: Arc::new(Mutex::new(client)),
        }
    }
}
