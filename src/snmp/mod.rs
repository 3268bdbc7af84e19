use anyhow::Result;
use async_trait::async_trait;
use tokio::time::{Duration, timeout};

use crate::collector::ProtocolClient;
use crate::config::DeviceTarget;
use crate::config::settings::ConnectionSettings;

pub mod oid;
pub mod v2c;
pub mod value;

pub use oid::parse_oid;
pub use v2c::SnmpClientV2c;

/// SNMPv2c клиент для коллектора.
///
/// Сессия открывается лениво и переиспользуется, пока цель не меняется.
/// После неудачного запроса сессия пересоздаётся.
pub struct SnmpFetcher {
    port: u16,
    attempt_timeout: Duration,
    retries: u32,
    session: Option<(DeviceTarget, SnmpClientV2c)>,
}

impl SnmpFetcher {
    pub fn new(connection: &ConnectionSettings, timeout_secs: u64) -> Self {
        Self {
            port: connection.port,
            attempt_timeout: Duration::from_secs(timeout_secs.max(1)),
            retries: connection.retries,
            session: None,
        }
    }

    async fn session(&mut self, target: &DeviceTarget) -> Result<&mut SnmpClientV2c> {
        let stale = self
            .session
            .as_ref()
            .is_some_and(|(current, _)| current != target);
        if stale {
            self.session = None;
        }

        if self.session.is_none() {
            let addr = target.socket_addr(self.port);
            let client = SnmpClientV2c::new(&addr, target.community.as_bytes()).await?;
            tracing::debug!(%addr, "SNMP сессия открыта");
            self.session = Some((target.clone(), client));
        }

        self.session
            .as_mut()
            .map(|(_, client)| client)
            .ok_or_else(|| anyhow::anyhow!("SNMP сессия не открыта"))
    }

    async fn attempt(&mut self, target: &DeviceTarget, oid: &snmp2::Oid<'_>) -> Result<String> {
        let attempt_timeout = self.attempt_timeout;
        let client = self.session(target).await?;

        match timeout(attempt_timeout, client.get(oid)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!("Таймаут после {:?}", attempt_timeout)),
        }
    }
}

#[async_trait]
impl ProtocolClient for SnmpFetcher {
    async fn get(&mut self, target: &DeviceTarget, oid: &str) -> Result<String> {
        let parsed = parse_oid(oid)?;
        let mut attempt = 0;

        loop {
            match self.attempt(target, &parsed).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    // Сокет мог остаться в плохом состоянии - открываем заново
                    self.session = None;
                    if attempt >= self.retries {
                        return Err(e);
                    }
                    attempt += 1;
                    tracing::debug!(%oid, attempt, error = %e, "повтор SNMP GET");
                }
            }
        }
    }

    /// Общий бюджет запроса с учётом повторов
    fn timeout(&self) -> Duration {
        self.attempt_timeout * (self.retries + 1)
    }
}
