use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

pub mod ec710;

/// Семантический тип измерения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    Power,
    Temperature,
    Current,
    Voltage,
    Signal,
    Status,
}

/// Семантический тип аварии
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmType {
    Power,
    Temperature,
    PowerSupply,
    Voltage,
    System,
    Cooling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

/// Правило преобразования сырого значения: либо множитель, либо таблица меток
#[derive(Debug, Clone, PartialEq)]
pub enum TransformRule {
    Scale { factor: f64 },
    Enum { labels: BTreeMap<String, String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementDefinition {
    pub id: String,
    pub oid: String,
    pub name: String,
    pub unit: String,
    pub description: String,
    pub kind: MeasurementType,
    pub rule: TransformRule,
}

impl MeasurementDefinition {
    /// Числовое измерение: raw * factor
    pub fn scaled(
        id: &str,
        oid: impl Into<String>,
        name: &str,
        unit: &str,
        description: &str,
        kind: MeasurementType,
        factor: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            oid: oid.into(),
            name: name.to_string(),
            unit: unit.to_string(),
            description: description.to_string(),
            kind,
            rule: TransformRule::Scale { factor },
        }
    }

    /// Перечислимое измерение: raw -> метка
    pub fn enumerated(
        id: &str,
        oid: impl Into<String>,
        name: &str,
        unit: &str,
        description: &str,
        kind: MeasurementType,
        labels: &[(&str, &str)],
    ) -> Self {
        Self {
            id: id.to_string(),
            oid: oid.into(),
            name: name.to_string(),
            unit: unit.to_string(),
            description: description.to_string(),
            kind,
            rule: TransformRule::Enum {
                labels: labels
                    .iter()
                    .map(|(raw, label)| (raw.to_string(), label.to_string()))
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlarmDefinition {
    pub id: String,
    pub oid: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub kind: AlarmType,
}

impl AlarmDefinition {
    pub fn new(
        id: &str,
        oid: impl Into<String>,
        name: &str,
        description: &str,
        severity: Severity,
        kind: AlarmType,
    ) -> Self {
        Self {
            id: id.to_string(),
            oid: oid.into(),
            name: name.to_string(),
            description: description.to_string(),
            severity,
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Measurement,
    Alarm,
}

/// Результат поиска в каталоге по виду элемента
#[derive(Debug, Clone, Copy)]
pub enum Definition<'a> {
    Measurement(&'a MeasurementDefinition),
    Alarm(&'a AlarmDefinition),
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("duplicate measurement id: {0}")]
    DuplicateMeasurement(String),
    #[error("duplicate alarm id: {0}")]
    DuplicateAlarm(String),
    #[error("critical measurement '{0}' has no definition")]
    UnknownCriticalMeasurement(String),
    #[error("critical alarm '{0}' has no definition")]
    UnknownCriticalAlarm(String),
    #[error("measurement '{0}' has an empty label mapping")]
    EmptyEnumMapping(String),
}

/// Статический каталог измерений и аварий устройства.
///
/// Строится один раз при старте и дальше только читается, поэтому
/// его можно шарить между задачами через `Arc` без синхронизации.
#[derive(Debug, Clone)]
pub struct Catalog {
    measurements: Vec<MeasurementDefinition>,
    alarms: Vec<AlarmDefinition>,
    measurement_index: HashMap<String, usize>,
    alarm_index: HashMap<String, usize>,
    critical_measurements: Vec<String>,
    critical_alarms: Vec<String>,
}

impl Catalog {
    /// Собирает каталог и проверяет его целостность
    pub fn new(
        measurements: Vec<MeasurementDefinition>,
        alarms: Vec<AlarmDefinition>,
        critical_measurements: Vec<String>,
        critical_alarms: Vec<String>,
    ) -> Result<Self, CatalogError> {
        let mut measurement_index = HashMap::new();
        for (pos, m) in measurements.iter().enumerate() {
            if let TransformRule::Enum { labels } = &m.rule {
                if labels.is_empty() {
                    return Err(CatalogError::EmptyEnumMapping(m.id.clone()));
                }
            }
            if measurement_index.insert(m.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateMeasurement(m.id.clone()));
            }
        }

        let mut alarm_index = HashMap::new();
        for (pos, a) in alarms.iter().enumerate() {
            if alarm_index.insert(a.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateAlarm(a.id.clone()));
            }
        }

        if let Some(id) = critical_measurements
            .iter()
            .find(|id| !measurement_index.contains_key(*id))
        {
            return Err(CatalogError::UnknownCriticalMeasurement(id.clone()));
        }
        if let Some(id) = critical_alarms
            .iter()
            .find(|id| !alarm_index.contains_key(*id))
        {
            return Err(CatalogError::UnknownCriticalAlarm(id.clone()));
        }

        // Повторы в критических списках не нужны - оставляем первое вхождение
        let critical_measurements = dedup_ordered(critical_measurements);
        let critical_alarms = dedup_ordered(critical_alarms);

        Ok(Self {
            measurements,
            alarms,
            measurement_index,
            alarm_index,
            critical_measurements,
            critical_alarms,
        })
    }

    pub fn measurement(&self, id: &str) -> Option<&MeasurementDefinition> {
        self.measurement_index
            .get(id)
            .map(|&pos| &self.measurements[pos])
    }

    pub fn alarm(&self, id: &str) -> Option<&AlarmDefinition> {
        self.alarm_index.get(id).map(|&pos| &self.alarms[pos])
    }

    pub fn definition(&self, kind: ItemKind, id: &str) -> Option<Definition<'_>> {
        match kind {
            ItemKind::Measurement => self.measurement(id).map(Definition::Measurement),
            ItemKind::Alarm => self.alarm(id).map(Definition::Alarm),
        }
    }

    /// Идентификаторы, опрашиваемые каждый цикл, в порядке объявления
    pub fn critical_ids(&self, kind: ItemKind) -> &[String] {
        match kind {
            ItemKind::Measurement => &self.critical_measurements,
            ItemKind::Alarm => &self.critical_alarms,
        }
    }

    pub fn measurements(&self) -> &[MeasurementDefinition] {
        &self.measurements
    }

    pub fn alarms(&self) -> &[AlarmDefinition] {
        &self.alarms
    }

    /// Дамп каталога для отладочных и discovery эндпоинтов
    pub fn introspect(&self) -> CatalogInfo {
        CatalogInfo {
            measurements: self
                .measurements
                .iter()
                .map(|m| MeasurementInfo {
                    key: m.id.clone(),
                    oid: m.oid.clone(),
                    name: m.name.clone(),
                    unit: m.unit.clone(),
                    kind: m.kind,
                })
                .collect(),
            alarms: self
                .alarms
                .iter()
                .map(|a| AlarmInfo {
                    key: a.id.clone(),
                    oid: a.oid.clone(),
                    name: a.name.clone(),
                    severity: a.severity,
                    kind: a.kind,
                })
                .collect(),
            critical_measurements: self.critical_measurements.clone(),
            critical_alarms: self.critical_alarms.clone(),
        }
    }
}

fn dedup_ordered(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogInfo {
    pub measurements: Vec<MeasurementInfo>,
    pub alarms: Vec<AlarmInfo>,
    pub critical_measurements: Vec<String>,
    pub critical_alarms: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeasurementInfo {
    pub key: String,
    pub oid: String,
    pub name: String,
    pub unit: String,
    #[serde(rename = "type")]
    pub kind: MeasurementType,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlarmInfo {
    pub key: String,
    pub oid: String,
    pub name: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: AlarmType,
}
