use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{Duration, timeout};

use crate::catalog::{Catalog, ItemKind};
use crate::config::DeviceTarget;
use crate::formatter::{AlarmEvaluator, ValueFormatter};

pub mod types;

pub use types::{AlarmStatus, CollectError, MeasurementReading, Snapshot};

/// Внешний клиент протокола: одно значение на один адрес.
///
/// `&mut self` гарантирует, что один канал не используется двумя циклами
/// одновременно. Если клиент общий, вызывающий держит его под мьютексом.
#[async_trait]
pub trait ProtocolClient: Send {
    async fn get(&mut self, target: &DeviceTarget, oid: &str) -> anyhow::Result<String>;

    /// Таймаут одного запроса
    fn timeout(&self) -> Duration;
}

/// Цикл сбора телеметрии по критическим спискам каталога
#[derive(Debug, Clone)]
pub struct Collector {
    catalog: Arc<Catalog>,
}

impl Collector {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Выполняет один цикл опроса.
    ///
    /// Ошибка по одному элементу попадает в `errors` и цикл продолжается.
    /// Snapshot собирается только в конце, так что отмена future не оставляет
    /// наполовину заполненного результата.
    pub async fn collect<C>(&self, target: Option<&DeviceTarget>, client: &mut C) -> Snapshot
    where
        C: ProtocolClient + ?Sized,
    {
        let Some(target) = target else {
            return Snapshot::not_configured("device is not configured");
        };
        if !target.is_complete() {
            return Snapshot::not_configured("incomplete configuration");
        }

        let mut errors = Vec::new();
        let measurements = self.collect_measurements(target, client, &mut errors).await;
        let alarms = self.collect_alarms(target, client, &mut errors).await;

        tracing::debug!(
            device = %target.ip,
            measurements = measurements.len(),
            alarms = alarms.len(),
            errors = errors.len(),
            "цикл опроса завершён"
        );

        Snapshot {
            configured: true,
            message: None,
            measurements,
            alarms,
            errors,
            target: Some(target.clone()),
            timestamp: Utc::now(),
        }
    }

    async fn collect_measurements<C>(
        &self,
        target: &DeviceTarget,
        client: &mut C,
        errors: &mut Vec<CollectError>,
    ) -> Vec<MeasurementReading>
    where
        C: ProtocolClient + ?Sized,
    {
        let mut readings = Vec::new();

        for id in self.catalog.critical_ids(ItemKind::Measurement) {
            let Some(definition) = self.catalog.measurement(id) else {
                tracing::debug!(%id, "критическое измерение не описано в каталоге, пропуск");
                continue;
            };

            let raw = match fetch(client, target, id, &definition.name, &definition.oid).await {
                Ok(raw) => raw,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            match ValueFormatter::apply(definition, &raw) {
                Ok(value) => readings.push(MeasurementReading {
                    id: id.clone(),
                    value,
                    unit: definition.unit.clone(),
                    name: definition.name.clone(),
                    description: definition.description.clone(),
                    kind: definition.kind,
                    raw,
                }),
                Err(source) => {
                    tracing::warn!(%id, %raw, "не удалось отформатировать значение измерения");
                    errors.push(CollectError::Format {
                        id: id.clone(),
                        name: definition.name.clone(),
                        source,
                    });
                }
            }
        }

        readings
    }

    async fn collect_alarms<C>(
        &self,
        target: &DeviceTarget,
        client: &mut C,
        errors: &mut Vec<CollectError>,
    ) -> Vec<AlarmStatus>
    where
        C: ProtocolClient + ?Sized,
    {
        let mut statuses = Vec::new();

        for id in self.catalog.critical_ids(ItemKind::Alarm) {
            let Some(definition) = self.catalog.alarm(id) else {
                tracing::debug!(%id, "критическая авария не описана в каталоге, пропуск");
                continue;
            };

            match fetch(client, target, id, &definition.name, &definition.oid).await {
                Ok(raw) => {
                    if let Some(status) = AlarmEvaluator::evaluate(&self.catalog, id, &raw) {
                        statuses.push(status);
                    }
                }
                Err(e) => errors.push(e),
            }
        }

        statuses
    }
}

/// Один GET с таймаутом клиента
async fn fetch<C>(
    client: &mut C,
    target: &DeviceTarget,
    id: &str,
    name: &str,
    oid: &str,
) -> Result<String, CollectError>
where
    C: ProtocolClient + ?Sized,
{
    let timeout_duration = client.timeout();

    match timeout(timeout_duration, client.get(target, oid)).await {
        Ok(Ok(raw)) => Ok(raw),
        Ok(Err(e)) => {
            tracing::warn!(%id, %oid, error = %e, "SNMP GET не удался");
            Err(CollectError::Retrieval {
                id: id.to_string(),
                name: name.to_string(),
                oid: oid.to_string(),
                reason: format!("{:#}", e),
            })
        }
        Err(_) => {
            tracing::warn!(%id, %oid, "таймаут SNMP GET");
            Err(CollectError::Timeout {
                id: id.to_string(),
                name: name.to_string(),
                oid: oid.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        AlarmDefinition, AlarmType, MeasurementDefinition, MeasurementType, Severity, ec710,
    };
    use std::collections::HashMap;

    /// Клиент-заглушка: OID -> ответ, отсутствующий OID -> ошибка
    struct MockClient {
        responses: HashMap<String, String>,
        delays: HashMap<String, Duration>,
        calls: Vec<String>,
        timeout: Duration,
    }

    impl MockClient {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                delays: HashMap::new(),
                calls: Vec::new(),
                timeout: Duration::from_secs(3),
            }
        }

        fn respond(mut self, catalog: &Catalog, id: &str, raw: &str) -> Self {
            let oid = catalog
                .measurement(id)
                .map(|m| m.oid.clone())
                .or_else(|| catalog.alarm(id).map(|a| a.oid.clone()))
                .unwrap();
            self.responses.insert(oid, raw.to_string());
            self
        }

        /// Ответы на все критические элементы каталога
        fn healthy(catalog: &Catalog) -> Self {
            let mut client = Self::new();
            for id in catalog.critical_ids(ItemKind::Measurement) {
                client = client.respond(catalog, id, "1000");
            }
            for id in catalog.critical_ids(ItemKind::Alarm) {
                let alarm = catalog.alarm(id).unwrap();
                client.responses.insert(alarm.oid.clone(), "0".into());
            }
            client
        }

        fn without(mut self, catalog: &Catalog, id: &str) -> Self {
            let oid = catalog
                .measurement(id)
                .map(|m| m.oid.clone())
                .or_else(|| catalog.alarm(id).map(|a| a.oid.clone()))
                .unwrap();
            self.responses.remove(&oid);
            self
        }
    }

    #[async_trait]
    impl ProtocolClient for MockClient {
        async fn get(&mut self, _target: &DeviceTarget, oid: &str) -> anyhow::Result<String> {
            self.calls.push(oid.to_string());
            if let Some(delay) = self.delays.get(oid) {
                tokio::time::sleep(*delay).await;
            }
            self.responses
                .get(oid)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no response for {}", oid))
        }

        fn timeout(&self) -> Duration {
            self.timeout
        }
    }

    fn collector() -> Collector {
        Collector::new(Arc::new(ec710::catalog().unwrap()))
    }

    fn target() -> DeviceTarget {
        DeviceTarget::new("192.168.1.50", "public")
    }

    #[tokio::test]
    async fn missing_configuration_short_circuits() {
        let collector = collector();
        let mut client = MockClient::new();

        let snapshot = collector.collect(None, &mut client).await;
        assert!(!snapshot.configured);
        assert_eq!(snapshot.message.as_deref(), Some("device is not configured"));
        assert!(snapshot.measurements.is_empty());
        assert!(snapshot.alarms.is_empty());
        assert!(snapshot.errors.is_empty());
        assert!(client.calls.is_empty());

        let incomplete = DeviceTarget::new("192.168.1.50", "");
        let snapshot = collector.collect(Some(&incomplete), &mut client).await;
        assert!(!snapshot.configured);
        assert_eq!(snapshot.message.as_deref(), Some("incomplete configuration"));
        assert!(client.calls.is_empty());
    }

    #[tokio::test]
    async fn healthy_device_produces_full_snapshot_in_catalog_order() {
        let collector = collector();
        let catalog = collector.catalog();
        let mut client = MockClient::healthy(catalog)
            .respond(catalog, "forwardPower", "8450")
            .respond(catalog, "outputPowerZero", "1");

        let snapshot = collector.collect(Some(&target()), &mut client).await;

        assert!(snapshot.configured);
        assert!(snapshot.errors.is_empty());

        let ids: Vec<_> = snapshot.measurements.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, catalog.critical_ids(ItemKind::Measurement));
        let ids: Vec<_> = snapshot.alarms.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, catalog.critical_ids(ItemKind::Alarm));

        let forward = snapshot.measurement("forwardPower").unwrap();
        assert_eq!(forward.value, "84.50");
        assert_eq!(forward.raw, "8450");
        assert_eq!(forward.unit, "W");
        assert_eq!(snapshot.measurement("paCurrent").unwrap().value, "10.00");

        assert!(snapshot.alarm("outputPowerZero").unwrap().active);
        assert!(!snapshot.alarm("paTemperature").unwrap().active);
        assert_eq!(snapshot.active_alarms().count(), 1);
        assert_eq!(snapshot.target, Some(target()));
    }

    #[tokio::test]
    async fn one_failed_measurement_does_not_abort_cycle() {
        let collector = collector();
        let catalog = collector.catalog();
        let total = catalog.critical_ids(ItemKind::Measurement).len();
        let mut client = MockClient::healthy(catalog).without(catalog, "paCurrent");

        let snapshot = collector.collect(Some(&target()), &mut client).await;

        assert_eq!(snapshot.measurements.len(), total - 1);
        assert_eq!(snapshot.errors.len(), 1);
        assert!(matches!(&snapshot.errors[0], CollectError::Retrieval { id, .. } if id == "paCurrent"));
        assert!(snapshot.measurement("paCurrent").is_none());
        // аварии опрошены несмотря на ошибку в измерениях
        assert_eq!(snapshot.alarms.len(), catalog.critical_ids(ItemKind::Alarm).len());
    }

    #[tokio::test]
    async fn format_failure_is_recorded_per_item() {
        let collector = collector();
        let catalog = collector.catalog();
        let mut client = MockClient::healthy(catalog).respond(catalog, "paTemperature", "N/A");

        let snapshot = collector.collect(Some(&target()), &mut client).await;

        assert_eq!(snapshot.errors.len(), 1);
        assert_eq!(snapshot.errors[0].item_id(), "paTemperature");
        assert_eq!(
            snapshot.errors[0].to_string(),
            "failed to format PA Temperature: raw value 'N/A' is not an integer"
        );
        assert!(snapshot.measurement("paTemperature").is_none());
        assert!(!snapshot.alarm("paTemperature").unwrap().active);
    }

    #[tokio::test]
    async fn failed_alarm_retrieval_is_recorded() {
        let collector = collector();
        let catalog = collector.catalog();
        let mut client = MockClient::healthy(catalog).without(catalog, "outputPowerZero");

        let snapshot = collector.collect(Some(&target()), &mut client).await;

        assert_eq!(snapshot.errors.len(), 1);
        assert_eq!(snapshot.errors[0].item_id(), "outputPowerZero");
        assert!(snapshot.alarm("outputPowerZero").is_none());
        assert_eq!(snapshot.alarms.len(), catalog.critical_ids(ItemKind::Alarm).len() - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_response_becomes_timeout_error() {
        let collector = collector();
        let catalog = collector.catalog();
        let mut client = MockClient::healthy(catalog);
        let oid = catalog.measurement("reflectedPower").unwrap().oid.clone();
        client.delays.insert(oid, Duration::from_secs(10));

        let snapshot = collector.collect(Some(&target()), &mut client).await;

        assert_eq!(snapshot.errors.len(), 1);
        assert!(matches!(
            &snapshot.errors[0],
            CollectError::Timeout { id, .. } if id == "reflectedPower"
        ));
        assert_eq!(
            snapshot.measurements.len(),
            catalog.critical_ids(ItemKind::Measurement).len() - 1
        );
    }

    #[tokio::test]
    async fn repeated_cycles_differ_only_in_timestamp() {
        let collector = collector();
        let catalog = collector.catalog();
        let mut client = MockClient::healthy(catalog).without(catalog, "paTemperature");

        let first = collector.collect(Some(&target()), &mut client).await;
        let second = collector.collect(Some(&target()), &mut client).await;

        assert_ne!(first.errors, Vec::new());
        assert_eq!(
            first,
            Snapshot {
                timestamp: first.timestamp,
                ..second
            }
        );
    }

    #[tokio::test]
    async fn critical_lists_drive_what_is_polled() {
        let catalog = Catalog::new(
            vec![MeasurementDefinition::scaled(
                "forwardPower",
                "1.1.1",
                "Forward Power",
                "W",
                "",
                MeasurementType::Power,
                0.01,
            )],
            vec![
                AlarmDefinition::new("a", "1.2.1", "A", "", Severity::Critical, AlarmType::Power),
                AlarmDefinition::new("b", "1.2.2", "B", "", Severity::Warning, AlarmType::Cooling),
            ],
            vec!["forwardPower".into()],
            vec!["b".into()],
        )
        .unwrap();
        let collector = Collector::new(Arc::new(catalog));
        let mut client = MockClient::new();
        client.responses.insert("1.1.1".into(), "100".into());
        client.responses.insert("1.2.1".into(), "1".into());
        client.responses.insert("1.2.2".into(), "1".into());

        let snapshot = collector.collect(Some(&target()), &mut client).await;

        assert_eq!(client.calls, ["1.1.1", "1.2.2"]);
        assert_eq!(snapshot.measurements[0].value, "1.00");
        assert_eq!(snapshot.alarms.len(), 1);
        assert_eq!(snapshot.alarms[0].id, "b");
    }
}
