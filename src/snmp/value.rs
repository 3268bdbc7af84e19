use anyhow::Result;
use snmp2::Value;

/// Строковое представление значения, как его печатает `snmpget` после типа
pub fn render_value(value: &Value<'_>) -> Result<String> {
    match value {
        Value::Integer(v) => Ok(v.to_string()),
        Value::Counter32(v) | Value::Unsigned32(v) | Value::Timeticks(v) => Ok(v.to_string()),
        Value::Counter64(v) => Ok(v.to_string()),
        Value::Boolean(v) => Ok(if *v { "1" } else { "0" }.to_string()),
        Value::OctetString(bytes) | Value::Opaque(bytes) => {
            Ok(String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string())
        }
        Value::ObjectIdentifier(oid) => Ok(oid.to_string()),
        Value::IpAddress(octets) => Ok(format!(
            "{}.{}.{}.{}",
            octets[0], octets[1], octets[2], octets[3]
        )),
        Value::NoSuchObject => anyhow::bail!("объект не существует (noSuchObject)"),
        Value::NoSuchInstance => anyhow::bail!("экземпляр не существует (noSuchInstance)"),
        Value::EndOfMibView => anyhow::bail!("конец MIB (endOfMibView)"),
        other => anyhow::bail!("Неподдерживаемый тип SNMP значения: {:?}", other),
    }
}
