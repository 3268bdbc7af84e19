use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Базовые настройки приложения
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Настройки HTTP сервера
    pub server: ServerSettings,
    /// Настройки подключения к устройству
    pub connection: ConnectionSettings,
    /// Файл с сохранённой конфигурацией устройства
    pub device_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    /// Порт на случай, если основной адрес занят или недоступен
    pub fallback_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Таймаут для SNMP операций (секунды)
    pub timeout: u64,
    /// Количество повторов при ошибках
    pub retries: u32,
    /// UDP порт агента
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            connection: ConnectionSettings::default(),
            device_file: PathBuf::from("./config.json"),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:80".to_string(),
            fallback_port: 3000,
        }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            timeout: 3,
            retries: 1,
            port: 161,
        }
    }
}

impl Settings {
    /// Загружает настройки из YAML. Нет файла - настройки по умолчанию.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "файл настроек не найден, используются значения по умолчанию");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Не удалось прочитать файл настроек: {}", path.display()))?;

        serde_yml::from_str(&content)
            .with_context(|| format!("Не удалось распарсить YAML: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path().join("settings.yaml")).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.connection.timeout, 3);
        assert_eq!(settings.server.fallback_port, 3000);
        assert_eq!(settings.device_file, PathBuf::from("./config.json"));
    }

    #[test]
    fn partial_yaml_is_merged_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "connection:\n  timeout: 7\n  retries: 0\ndevice_file: /var/lib/telemetry/device.json"
        )
        .unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.connection.timeout, 7);
        assert_eq!(settings.connection.retries, 0);
        assert_eq!(settings.connection.port, 161);
        assert_eq!(settings.server.bind, "0.0.0.0:80");
        assert_eq!(settings.device_file, PathBuf::from("/var/lib/telemetry/device.json"));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "connection: [not, a, map]").unwrap();

        assert!(Settings::load(file.path()).is_err());
    }
}
