use anyhow::{Context, Result};
use snmp2::Oid;

/// Парсит строку OID ("1.3.6.1..." или ".1.3.6.1...") в объект Oid
pub fn parse_oid(s: &str) -> Result<Oid<'static>> {
    let parts: Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();

    let parts = parts.with_context(|| format!("Невалидный OID: {}", s))?;
    if parts.len() < 2 {
        anyhow::bail!("OID '{}' должен содержать минимум два компонента", s);
    }

    Oid::from(&parts).map_err(|e| anyhow::anyhow!("Не удалось создать Oid из '{}': {:?}", s, e))
}
