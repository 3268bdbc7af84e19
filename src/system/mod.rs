//! Метрики хоста, на котором крутится сервер (обычно Raspberry Pi у передатчика).

use serde::Serialize;
use tokio::process::Command;

const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub tailscale_ip: String,
    pub cpu_temp: String,
    pub ram_usage: u64,
    pub ram_total: u64,
    pub ram_used: u64,
    pub disk_usage: u64,
    pub disk_total: String,
    pub disk_used: String,
    pub disk_available: String,
    pub uptime: String,
    pub connectivity: String,
    pub hostname: String,
    pub platform: String,
    pub arch: String,
    pub load_average: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub total_mb: u64,
    pub used_mb: u64,
    pub percent: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskUsage {
    pub percent: u64,
    pub total: String,
    pub used: String,
    pub available: String,
}

impl SystemInfo {
    /// Собирает всё, что получится. Каждая проба падает в значение по умолчанию.
    pub async fn gather() -> Self {
        let tailscale_ip = run("tailscale", &["ip", "--4"])
            .await
            .and_then(|out| out.lines().next().map(str::to_string))
            .unwrap_or_else(|| "unavailable".to_string());

        let cpu_temp = read(THERMAL_ZONE)
            .await
            .and_then(|raw| parse_cpu_temp(&raw))
            .unwrap_or_else(|| "N/A".to_string());

        let memory = read("/proc/meminfo")
            .await
            .and_then(|raw| parse_meminfo(&raw))
            .unwrap_or(MemoryUsage {
                total_mb: 0,
                used_mb: 0,
                percent: 0,
            });

        let disk = run("df", &["-h", "/"])
            .await
            .and_then(|out| parse_df(&out))
            .unwrap_or_else(|| DiskUsage {
                percent: 0,
                total: "0B".to_string(),
                used: "0B".to_string(),
                available: "0B".to_string(),
            });

        let uptime = read("/proc/uptime")
            .await
            .and_then(|raw| raw.split_whitespace().next()?.parse::<f64>().ok())
            .map(|secs| format_uptime(secs as u64))
            .unwrap_or_else(|| "N/A".to_string());

        let connectivity = match Command::new("ping")
            .args(["-c", "1", "-W", "2", "8.8.8.8"])
            .output()
            .await
        {
            Ok(out) if out.status.success() => "stable",
            _ => "unstable",
        }
        .to_string();

        let hostname = read("/proc/sys/kernel/hostname")
            .await
            .map(|h| h.trim().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let load_average = read("/proc/loadavg")
            .await
            .and_then(|raw| parse_loadavg(&raw))
            .unwrap_or([0.0; 3]);

        Self {
            tailscale_ip,
            cpu_temp,
            ram_usage: memory.percent,
            ram_total: memory.total_mb,
            ram_used: memory.used_mb,
            disk_usage: disk.percent,
            disk_total: disk.total,
            disk_used: disk.used,
            disk_available: disk.available,
            uptime,
            connectivity,
            hostname,
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            load_average,
        }
    }
}

async fn read(path: &str) -> Option<String> {
    tokio::fs::read_to_string(path).await.ok()
}

async fn run(program: &str, args: &[&str]) -> Option<String> {
    let out = Command::new(program).args(args).output().await.ok()?;
    if !out.status.success() {
        tracing::debug!(%program, status = %out.status, "команда завершилась с ошибкой");
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// Миллиградусы -> градусы с одним знаком
pub fn parse_cpu_temp(raw: &str) -> Option<String> {
    let millis: i64 = raw.trim().parse().ok()?;
    Some(format!("{:.1}", millis as f64 / 1000.0))
}

pub fn parse_meminfo(raw: &str) -> Option<MemoryUsage> {
    let field = |name: &str| -> Option<u64> {
        raw.lines()
            .find(|line| line.starts_with(name))?
            .split_whitespace()
            .nth(1)?
            .parse()
            .ok()
    };

    let total_kb = field("MemTotal:")?;
    let available_kb = field("MemAvailable:")?;
    if total_kb == 0 {
        return None;
    }

    let used_kb = total_kb.saturating_sub(available_kb);

    Some(MemoryUsage {
        total_mb: total_kb / 1024,
        used_mb: used_kb / 1024,
        percent: (used_kb as f64 / total_kb as f64 * 100.0).round() as u64,
    })
}

/// Последняя строка `df -h /`
pub fn parse_df(output: &str) -> Option<DiskUsage> {
    let line = output.lines().last()?;
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < 5 {
        return None;
    }

    Some(DiskUsage {
        percent: cols[4].trim_end_matches('%').parse().ok()?,
        total: cols[1].to_string(),
        used: cols[2].to_string(),
        available: cols[3].to_string(),
    })
}

pub fn parse_loadavg(raw: &str) -> Option<[f64; 3]> {
    let mut it = raw.split_whitespace().map(|v| v.parse::<f64>().ok());
    Some([it.next()??, it.next()??, it.next()??])
}

pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    format!("{}d {}h {}m", days, hours, minutes)
}
