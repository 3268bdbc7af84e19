use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};

/// Адрес устройства и community для SNMPv2c
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTarget {
    pub ip: String,
    #[serde(alias = "comunidade")]
    pub community: String,
}

impl DeviceTarget {
    pub fn new(ip: impl Into<String>, community: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            community: community.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.ip.trim().is_empty() && !self.community.is_empty()
    }

    /// `host:port` для сокета; порт из `ip` имеет приоритет.
    /// Голый IPv6 адрес берётся в скобки.
    pub fn socket_addr(&self, default_port: u16) -> String {
        let host = self.ip.trim();
        if host.parse::<SocketAddr>().is_ok() {
            return host.to_string();
        }
        if let Ok(v6) = host.parse::<Ipv6Addr>() {
            return SocketAddr::from((v6, default_port)).to_string();
        }
        match host.rsplit_once(':') {
            // hostname:port
            Some((name, port)) if !name.contains(':') && port.parse::<u16>().is_ok() => {
                host.to_string()
            }
            _ => format!("{}:{}", host, default_port),
        }
    }
}

/// Хранилище конфигурации устройства в JSON файле
#[derive(Debug, Clone)]
pub struct DeviceConfigStore {
    path: PathBuf,
}

impl DeviceConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None`, если устройство ещё не настраивали
    pub fn load(&self) -> Result<Option<DeviceTarget>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Не удалось прочитать файл: {}", self.path.display()))?;
        let target: DeviceTarget = serde_json::from_str(&content)
            .with_context(|| format!("Не удалось распарсить JSON: {}", self.path.display()))?;

        Ok(Some(target))
    }

    pub fn save(&self, target: &DeviceTarget) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Не удалось создать каталог: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(target)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Не удалось записать файл: {}", self.path.display()))?;

        tracing::info!(path = %self.path.display(), ip = %target.ip, "конфигурация устройства сохранена");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_not_configured() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeviceConfigStore::new(dir.path().join("config.json"));

        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeviceConfigStore::new(dir.path().join("nested/config.json"));
        let target = DeviceTarget::new("10.1.1.20", "private");

        store.save(&target).unwrap();
        assert_eq!(store.load().unwrap(), Some(target));
    }

    #[test]
    fn legacy_key_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"ip": "10.0.0.9", "comunidade": "public"}"#).unwrap();

        let target = DeviceConfigStore::new(&path).load().unwrap().unwrap();
        assert_eq!(target, DeviceTarget::new("10.0.0.9", "public"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(DeviceConfigStore::new(&path).load().is_err());
    }

    #[test]
    fn completeness_and_socket_address() {
        assert!(DeviceTarget::new("10.0.0.1", "public").is_complete());
        assert!(!DeviceTarget::new("  ", "public").is_complete());
        assert!(!DeviceTarget::new("10.0.0.1", "").is_complete());

        let target = DeviceTarget::new("10.0.0.1", "public");
        assert_eq!(target.socket_addr(161), "10.0.0.1:161");
        assert_eq!(DeviceTarget::new("10.0.0.1:1161", "p").socket_addr(161), "10.0.0.1:1161");
        assert_eq!(DeviceTarget::new("exciter.local", "p").socket_addr(161), "exciter.local:161");
        assert_eq!(
            DeviceTarget::new("exciter.local:1161", "p").socket_addr(161),
            "exciter.local:1161"
        );
    }

    #[test]
    fn ipv6_literal_gets_brackets_and_port() {
        assert_eq!(DeviceTarget::new("fe80::1", "p").socket_addr(161), "[fe80::1]:161");
        assert_eq!(DeviceTarget::new(" 2001:db8::7 ", "p").socket_addr(161), "[2001:db8::7]:161");
        assert_eq!(DeviceTarget::new("[fe80::1]:1161", "p").socket_addr(161), "[fe80::1]:1161");
    }
}
