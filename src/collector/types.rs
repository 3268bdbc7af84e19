use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::{AlarmType, MeasurementType, Severity};
use crate::config::DeviceTarget;
use crate::formatter::FormatError;

/// Отформатированное значение одного измерения
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementReading {
    pub id: String,
    pub value: String,
    pub unit: String,
    pub name: String,
    pub description: String,
    pub kind: MeasurementType,
    pub raw: String,
}

/// Состояние одной аварии, уже обогащённое данными из каталога
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmStatus {
    pub id: String,
    pub active: bool,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub kind: AlarmType,
}

/// Ошибка по одному элементу цикла. Цикл после неё продолжается.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CollectError {
    #[error("failed to read {name} ({oid}): {reason}")]
    Retrieval {
        id: String,
        name: String,
        oid: String,
        reason: String,
    },
    #[error("timed out reading {name} ({oid})")]
    Timeout { id: String, name: String, oid: String },
    #[error("failed to format {name}: {source}")]
    Format {
        id: String,
        name: String,
        #[source]
        source: FormatError,
    },
}

impl CollectError {
    pub fn item_id(&self) -> &str {
        match self {
            CollectError::Retrieval { id, .. }
            | CollectError::Timeout { id, .. }
            | CollectError::Format { id, .. } => id,
        }
    }
}

/// Результат одного цикла опроса.
///
/// Собирается целиком в конце цикла и дальше не меняется. Порядок
/// `measurements` и `alarms` совпадает с порядком критических списков каталога.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub configured: bool,
    /// Причина, по которой опрос не выполнялся
    pub message: Option<String>,
    pub measurements: Vec<MeasurementReading>,
    pub alarms: Vec<AlarmStatus>,
    pub errors: Vec<CollectError>,
    pub target: Option<DeviceTarget>,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    pub fn not_configured(reason: impl Into<String>) -> Self {
        Self {
            configured: false,
            message: Some(reason.into()),
            measurements: Vec::new(),
            alarms: Vec::new(),
            errors: Vec::new(),
            target: None,
            timestamp: Utc::now(),
        }
    }

    pub fn measurement(&self, id: &str) -> Option<&MeasurementReading> {
        self.measurements.iter().find(|m| m.id == id)
    }

    pub fn alarm(&self, id: &str) -> Option<&AlarmStatus> {
        self.alarms.iter().find(|a| a.id == id)
    }

    pub fn active_alarms(&self) -> impl Iterator<Item = &AlarmStatus> {
        self.alarms.iter().filter(|a| a.active)
    }
}
