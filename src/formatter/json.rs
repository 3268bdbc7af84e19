use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::catalog::{AlarmType, MeasurementType, Severity};
use crate::collector::{AlarmStatus, MeasurementReading, Snapshot};

// TODO: отдавать snapshot инкрементально (только изменившиеся значения) для дашборда

/// JSON документ с данными оборудования
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDataJson {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ResultSummary>,
    #[serde(serialize_with = "keyed_map")]
    pub measurements: Vec<(String, MeasurementJson)>,
    #[serde(serialize_with = "keyed_map")]
    pub alarms: Vec<(String, AlarmJson)>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_config: Option<EquipmentConfigJson>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub total: usize,
    pub successful: usize,
    pub active_alarms: usize,
    pub critical_active: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeasurementJson {
    pub value: String,
    pub unit: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: MeasurementType,
    pub raw: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlarmJson {
    pub active: bool,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: AlarmType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentConfigJson {
    pub ip: String,
    pub community: String,
    pub last_update: String,
}

/// Пары (ключ, значение) пишутся JSON объектом в исходном порядке
#[allow(clippy::ptr_arg)]
fn keyed_map<S, T>(entries: &Vec<(String, T)>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// JSON форматтер для snapshot'ов
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format_snapshot(snapshot: &Snapshot) -> EquipmentDataJson {
        if !snapshot.configured {
            return EquipmentDataJson {
                configured: false,
                message: snapshot.message.clone(),
                summary: None,
                measurements: Vec::new(),
                alarms: Vec::new(),
                errors: Vec::new(),
                equipment_config: None,
            };
        }

        let measurements = snapshot
            .measurements
            .iter()
            .map(|m| (m.id.clone(), Self::format_measurement(m)))
            .collect();

        let alarms = snapshot
            .alarms
            .iter()
            .map(|a| (a.id.clone(), Self::format_alarm(a)))
            .collect();

        let summary = ResultSummary {
            total: snapshot.measurements.len() + snapshot.alarms.len() + snapshot.errors.len(),
            successful: snapshot.measurements.len() + snapshot.alarms.len(),
            active_alarms: snapshot.active_alarms().count(),
            critical_active: snapshot
                .active_alarms()
                .filter(|a| a.severity == Severity::Critical)
                .count(),
        };

        EquipmentDataJson {
            configured: true,
            message: snapshot.message.clone(),
            summary: Some(summary),
            measurements,
            alarms,
            errors: snapshot.errors.iter().map(|e| e.to_string()).collect(),
            equipment_config: snapshot.target.as_ref().map(|t| EquipmentConfigJson {
                ip: t.ip.clone(),
                community: t.community.clone(),
                last_update: snapshot.timestamp.to_rfc3339(),
            }),
        }
    }

    fn format_measurement(reading: &MeasurementReading) -> MeasurementJson {
        MeasurementJson {
            value: reading.value.clone(),
            unit: reading.unit.clone(),
            name: reading.name.clone(),
            description: reading.description.clone(),
            kind: reading.kind,
            raw: reading.raw.clone(),
        }
    }

    fn format_alarm(status: &AlarmStatus) -> AlarmJson {
        AlarmJson {
            active: status.active,
            name: status.name.clone(),
            description: status.description.clone(),
            severity: status.severity,
            kind: status.kind,
        }
    }

    /// Сериализует snapshot в JSON строку
    pub fn to_json_string(snapshot: &Snapshot) -> anyhow::Result<String> {
        let json = Self::format_snapshot(snapshot);
        serde_json::to_string_pretty(&json)
            .map_err(|e| anyhow::anyhow!("Ошибка сериализации в JSON: {}", e))
    }
}
