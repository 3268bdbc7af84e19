use anyhow::Result;
use std::env;
use std::path::Path;

pub mod device;
pub mod settings;

pub use device::{DeviceConfigStore, DeviceTarget};
pub use settings::Settings;

pub const DEFAULT_SETTINGS_PATH: &str = "./config/settings.yaml";

/// Главная конфигурация приложения
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Базовые настройки
    pub settings: Settings,
    /// Сохранённая конфигурация устройства
    pub store: DeviceConfigStore,
}

impl AppConfig {
    /// Загружает настройки из YAML файла
    pub fn load(settings_path: impl AsRef<Path>) -> Result<Self> {
        let settings = Settings::load(settings_path)?;
        let store = DeviceConfigStore::new(settings.device_file.clone());

        Ok(Self { settings, store })
    }

    /// Путь к настройкам из `TELEMETRY_SETTINGS` или по умолчанию
    pub fn settings_path() -> String {
        env::var("TELEMETRY_SETTINGS").unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string())
    }

    /// Получает timeout из переменной окружения или из настроек
    pub fn get_timeout(&self) -> u64 {
        env::var("SNMP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.settings.connection.timeout)
    }

    /// Цель опроса: `SNMP_TARGET` + `SNMP_COMMUNITY` перекрывают файл
    pub fn get_target(&self) -> Result<Option<DeviceTarget>> {
        self.resolve_target(|key| env::var(key).ok())
    }

    /// Перекрытие срабатывает только когда заданы обе переменные
    fn resolve_target<F>(&self, lookup: F) -> Result<Option<DeviceTarget>>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let (Some(ip), Some(community)) = (lookup("SNMP_TARGET"), lookup("SNMP_COMMUNITY")) {
            return Ok(Some(DeviceTarget::new(ip, community)));
        }
        self.store.load()
    }
}
