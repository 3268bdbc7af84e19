use anyhow::{Context, Result};
use snmp2::{AsyncSession, Oid};

use super::value::render_value;

pub struct SnmpClientV2c {
    session: AsyncSession,
}

impl SnmpClientV2c {
    pub async fn new(target: &str, community: &[u8]) -> Result<Self> {
        let session = AsyncSession::new_v2c(target, community, 2)
            .await
            .with_context(|| format!("Не удалось создать SNMP сессию с {}", target))?;

        Ok(Self { session })
    }

    /// GET одного OID, значение сразу переводится в строку
    pub async fn get(&mut self, oid: &Oid<'_>) -> Result<String> {
        let resp = self
            .session
            .get(oid)
            .await
            .context("SNMP GET запрос не удался")?;

        let (_, value) = resp
            .varbinds
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("SNMP ответ пустой"))?;

        render_value(&value)
    }
}
