//! Prometheus metrics.

use crate::config::MetricsSettings;
use crate::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusRecorder};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::thread;

/// Default scrape port.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,
    /// Address to bind the metrics exporter.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: listen_on(DEFAULT_METRICS_PORT),
        }
    }
}

impl MetricsConfig {
    /// Builds metrics configuration from config settings with env overrides.
    ///
    /// `SPOTWATCH_METRICS_ENABLED` and `SPOTWATCH_METRICS_PORT` take
    /// precedence over the file.
    #[must_use]
    pub fn from_settings(settings: Option<&MetricsSettings>) -> Self {
        Self::resolve(settings, |key| std::env::var(key).ok())
    }

    fn resolve<F>(settings: Option<&MetricsSettings>, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = settings.and_then(|config| config.enabled).unwrap_or(false);
        let port = settings
            .and_then(|config| config.port)
            .unwrap_or(DEFAULT_METRICS_PORT);

        let mut config = Self {
            enabled,
            listen_addr: listen_on(port),
        };

        if let Some(enabled) = var("SPOTWATCH_METRICS_ENABLED").as_deref().map(parse_bool) {
            config.enabled = enabled;
        }
        if let Some(port) = var("SPOTWATCH_METRICS_PORT").and_then(|v| v.trim().parse().ok()) {
            config.listen_addr = listen_on(port);
        }

        config
    }
}

/// Installs the Prometheus recorder and its HTTP scrape listener.
///
/// Does nothing when metrics are disabled; the `metrics` macros are then
/// no-ops.
pub fn install_prometheus(config: &MetricsConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let builder = PrometheusBuilder::new().with_http_listener(config.listen_addr);
    install_listener(builder)?;

    tracing::info!(addr = %config.listen_addr, "Prometheus metrics listener started");
    Ok(())
}

fn install_listener(builder: PrometheusBuilder) -> Result<()> {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        return install_with_runtime(builder, &handle);
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::OperationFailed {
            operation: "metrics_runtime_init".to_string(),
            cause: e.to_string(),
        })?;
    let handle = runtime.handle().clone();
    install_with_runtime(builder, &handle)?;
    thread::Builder::new()
        .name("metrics-exporter-prometheus-http".to_string())
        .spawn(move || runtime.block_on(std::future::pending::<()>()))
        .map_err(|e| Error::OperationFailed {
            operation: "metrics_runtime_thread".to_string(),
            cause: e.to_string(),
        })?;
    Ok(())
}

fn install_with_runtime(
    builder: PrometheusBuilder,
    runtime_handle: &tokio::runtime::Handle,
) -> Result<()> {
    let (recorder, exporter) = {
        let _guard = runtime_handle.enter();
        builder.build().map_err(|e| Error::OperationFailed {
            operation: "metrics_exporter_build".to_string(),
            cause: e.to_string(),
        })?
    };
    set_global_recorder(recorder)?;
    runtime_handle.spawn(exporter);
    Ok(())
}

fn set_global_recorder(recorder: PrometheusRecorder) -> Result<()> {
    metrics::set_global_recorder(recorder).map_err(|e| Error::OperationFailed {
        operation: "metrics_recorder_install".to_string(),
        cause: e.to_string(),
    })
}

const fn listen_on(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)
}

fn parse_bool(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == "true" || value == "1" || value == "yes"
}
