use crate::catalog::{AlarmDefinition, Catalog};
use crate::collector::AlarmStatus;

/// Интерпретирует флаги аварий
pub struct AlarmEvaluator;

impl AlarmEvaluator {
    /// Статус аварии или `None`, если идентификатор не описан в каталоге
    pub fn evaluate(catalog: &Catalog, id: &str, raw: &str) -> Option<AlarmStatus> {
        catalog.alarm(id).map(|definition| Self::apply(definition, raw))
    }

    /// Активна только при целом значении ровно 1
    pub fn apply(definition: &AlarmDefinition, raw: &str) -> AlarmStatus {
        AlarmStatus {
            id: definition.id.clone(),
            active: is_active(raw),
            name: definition.name.clone(),
            description: definition.description.clone(),
            severity: definition.severity,
            kind: definition.kind,
        }
    }
}

fn is_active(raw: &str) -> bool {
    matches!(raw.trim().parse::<i64>(), Ok(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AlarmType, Severity, ec710};

    #[test]
    fn only_exact_one_is_active() {
        let catalog = ec710::catalog().unwrap();

        let status = AlarmEvaluator::evaluate(&catalog, "outputPowerZero", "1").unwrap();
        assert!(status.active);

        for raw in ["0", "", "1x", "2", "-1", "true", "1.0"] {
            let status = AlarmEvaluator::evaluate(&catalog, "outputPowerZero", raw).unwrap();
            assert!(!status.active, "raw {raw:?} must be inactive");
        }
    }

    #[test]
    fn status_is_enriched_from_catalog() {
        let catalog = ec710::catalog().unwrap();
        let status = AlarmEvaluator::evaluate(&catalog, "paTemperature", "1").unwrap();

        assert_eq!(status.id, "paTemperature");
        assert_eq!(status.name, "PA Temperature High");
        assert_eq!(status.severity, Severity::Warning);
        assert_eq!(status.kind, AlarmType::Temperature);
    }

    #[test]
    fn unknown_alarm_yields_none() {
        let catalog = ec710::catalog().unwrap();
        assert!(AlarmEvaluator::evaluate(&catalog, "forwardPower", "1").is_none());
    }
}
