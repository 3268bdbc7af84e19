use thiserror::Error;

use crate::catalog::{Catalog, MeasurementDefinition, TransformRule};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormatError {
    #[error("raw value '{raw}' is not an integer")]
    NotInteger { raw: String },
}

/// Превращает сырой ответ SNMP в значение для отображения
pub struct ValueFormatter;

impl ValueFormatter {
    /// Форматирует значение по идентификатору измерения.
    /// Неизвестный идентификатор - значение отдаётся как есть.
    pub fn format(catalog: &Catalog, id: &str, raw: &str) -> Result<String, FormatError> {
        match catalog.measurement(id) {
            Some(definition) => Self::apply(definition, raw),
            None => Ok(raw.to_string()),
        }
    }

    pub fn apply(definition: &MeasurementDefinition, raw: &str) -> Result<String, FormatError> {
        match &definition.rule {
            TransformRule::Scale { factor } => {
                let value: i64 = raw.trim().parse().map_err(|_| FormatError::NotInteger {
                    raw: raw.to_string(),
                })?;
                Ok(format!("{:.2}", value as f64 * factor))
            }
            TransformRule::Enum { labels } => Ok(labels
                .get(raw)
                .cloned()
                .unwrap_or_else(|| raw.to_string())),
        }
    }
}
