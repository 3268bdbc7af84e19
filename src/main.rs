use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use exciter_telemetry::collector::Collector;
use exciter_telemetry::handlers::AppState;
use exciter_telemetry::snmp::SnmpFetcher;
use exciter_telemetry::system::SystemInfo;
use exciter_telemetry::{catalog, config, routes};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = config::AppConfig::load(config::AppConfig::settings_path())?;
    let timeout = config.get_timeout();

    // Каталог строится один раз и дальше только читается
    let catalog = Arc::new(catalog::ec710::catalog().context("Встроенный каталог некорректен")?);
    tracing::info!(
        measurements = catalog.measurements().len(),
        alarms = catalog.alarms().len(),
        "каталог загружен"
    );

    let client = SnmpFetcher::new(&config.settings.connection, timeout);
    let listener = bind(&config.settings.server.bind, config.settings.server.fallback_port).await?;
    let state = AppState::new(config, Collector::new(catalog), client);

    tokio::spawn(log_system_info());

    tracing::info!(addr = %listener.local_addr()?, "сервер телеметрии запущен");
    axum::serve(listener, routes::create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Ошибка HTTP сервера")?;

    tracing::info!("сервер телеметрии остановлен");
    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("exciter_telemetry=info,tower_http=info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Пробуем основной адрес, при неудаче - запасной порт
async fn bind(addr: &str, fallback_port: u16) -> Result<TcpListener> {
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) => {
            tracing::warn!(%addr, error = %e, fallback_port, "основной адрес недоступен");
            let fallback = SocketAddr::from(([0, 0, 0, 0], fallback_port));
            TcpListener::bind(fallback)
                .await
                .with_context(|| format!("Не удалось занять {} и запасной {}", addr, fallback))
        }
    }
}

async fn log_system_info() {
    let info = SystemInfo::gather().await;
    tracing::info!(
        tailscale_ip = %info.tailscale_ip,
        cpu_temp = %info.cpu_temp,
        ram_usage = info.ram_usage,
        disk_usage = info.disk_usage,
        uptime = %info.uptime,
        connectivity = %info.connectivity,
        hostname = %info.hostname,
        "состояние хоста"
    );
}

/// Ждёт сигнал. Если подписаться не удалось, не завершается никогда,
/// иначе сервер остановился бы сразу после старта.
async fn signal_or_pending<F, E>(signal: F, name: &str)
where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    if let Err(e) = signal.await {
        tracing::error!(signal = %name, error = %e, "не удалось подписаться на сигнал");
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = signal_or_pending(tokio::signal::ctrl_c(), "Ctrl-C");

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "не удалось подписаться на SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("получен Ctrl-C"),
        _ = terminate => tracing::info!("получен SIGTERM"),
    }
}
