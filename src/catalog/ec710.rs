//! Каталог для возбудителя Linear EC710 LP (MIB SOCEXCITER).

use super::{
    AlarmDefinition, AlarmType, Catalog, CatalogError, MeasurementDefinition, MeasurementType,
    Severity,
};

/// enterprises.linear.ec710lp
pub const BASE_OID: &str = "1.3.6.1.4.1.25026.7";

// Опрашиваются только элементы с известными OID. Блоки питания, спутниковый
// тюнер и системные аварии (superCriticalPaTemperature, psu*CommFail,
// clockLockFail, v50EqpFail, fpgaCommun) ждут адресов из MIB устройства.
const CRITICAL_MEASUREMENTS: &[&str] =
    &["forwardPower", "reflectedPower", "paTemperature", "paCurrent"];

const CRITICAL_ALARMS: &[&str] = &["outputPowerZero", "paTemperature"];

fn oid(suffix: &str) -> String {
    format!("{}.{}", BASE_OID, suffix)
}

/// Собирает встроенный каталог EC710
pub fn catalog() -> Result<Catalog, CatalogError> {
    use MeasurementType as M;

    let measurements = vec![
        // RF мощность
        MeasurementDefinition::scaled(
            "programmedPower",
            oid("1.2.1.1.0"),
            "Programmed Power",
            "W",
            "Programmed RF output power",
            M::Power,
            0.01,
        ),
        MeasurementDefinition::scaled(
            "forwardPower",
            oid("1.2.1.2.0"),
            "Forward Power",
            "W",
            "Total RF power measured at the output",
            M::Power,
            0.01,
        ),
        MeasurementDefinition::scaled(
            "reflectedPower",
            oid("1.2.1.3.0"),
            "Reflected Power",
            "W",
            "Reflected RF power measured at the output",
            M::Power,
            0.01,
        ),
        // Усилитель мощности
        MeasurementDefinition::scaled(
            "paTemperature",
            oid("1.2.5.2.0"),
            "PA Temperature",
            "°C",
            "Power amplifier temperature",
            M::Temperature,
            0.01,
        ),
        MeasurementDefinition::scaled(
            "paCurrent",
            oid("1.2.5.1.0"),
            "PA Current",
            "A",
            "Current drawn by the power amplifier",
            M::Current,
            0.01,
        ),
    ];

    let alarms = vec![
        AlarmDefinition::new(
            "outputPowerZero",
            oid("1.3.1.27.0"),
            "Output Power Zero",
            "RF power programmed but no output reading",
            Severity::Critical,
            AlarmType::Power,
        ),
        AlarmDefinition::new(
            "reflectedPowerError",
            oid("1.3.1.58.0"),
            "Reflected Power Error",
            "Reflected power measurement error",
            Severity::Warning,
            AlarmType::Power,
        ),
        AlarmDefinition::new(
            "reducedPower",
            oid("1.3.1.53.0"),
            "Reduced Power",
            "Power reduced by reflected power or SFN failure",
            Severity::Warning,
            AlarmType::Power,
        ),
        AlarmDefinition::new(
            "paTemperature",
            oid("1.3.1.34.0"),
            "PA Temperature High",
            "Amplifier temperature above 75°C",
            Severity::Warning,
            AlarmType::Temperature,
        ),
    ];

    Catalog::new(
        measurements,
        alarms,
        CRITICAL_MEASUREMENTS.iter().map(|s| s.to_string()).collect(),
        CRITICAL_ALARMS.iter().map(|s| s.to_string()).collect(),
    )
}
