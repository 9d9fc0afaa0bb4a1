//! Prometheus metrics.

use crate::config::MetricsSettings;
use crate::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,
    /// Address to bind the metrics exporter.
    pub listen_addr: SocketAddr,
}

impl MetricsConfig {
    /// Default exporter port.
    pub const DEFAULT_PORT: u16 = 9090;

    /// Builds metrics configuration from config settings with env overrides.
    #[must_use]
    pub fn from_settings(settings: Option<&MetricsSettings>) -> Self {
        let enabled = settings.and_then(|config| config.enabled).unwrap_or(false);
        let port = settings
            .and_then(|config| config.port)
            .unwrap_or(Self::DEFAULT_PORT);

        let mut config = Self {
            enabled,
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
        };

        if let Some(enabled) = parse_bool_env("THREADKB_METRICS_ENABLED") {
            config.enabled = enabled;
        }
        if let Some(port) = parse_port_env("THREADKB_METRICS_PORT") {
            config.listen_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
        }

        config
    }
}

/// Installs the Prometheus recorder, and its HTTP listener when `expose` is set.
///
/// The listener is spawned on the current Tokio runtime.
///
/// # Errors
///
/// Returns an error if a recorder is already installed, the exporter cannot be
/// built, or `expose` is set outside a Tokio runtime.
pub fn install_prometheus(config: &MetricsConfig, expose: bool) -> Result<Option<PrometheusHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    if !expose {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| Error::OperationFailed {
                operation: "metrics_recorder_install".to_string(),
                cause: e.to_string(),
            })?;
        return Ok(Some(handle));
    }

    let runtime = tokio::runtime::Handle::try_current().map_err(|e| Error::OperationFailed {
        operation: "metrics_listener_install".to_string(),
        cause: e.to_string(),
    })?;

    let (recorder, exporter) = {
        let _guard = runtime.enter();
        PrometheusBuilder::new()
            .with_http_listener(config.listen_addr)
            .build()
            .map_err(|e| Error::OperationFailed {
                operation: "metrics_exporter_build".to_string(),
                cause: e.to_string(),
            })?
    };
    let handle = recorder.handle();
    metrics::set_global_recorder(recorder).map_err(|e| Error::OperationFailed {
        operation: "metrics_recorder_install".to_string(),
        cause: e.to_string(),
    })?;
    runtime.spawn(exporter);

    tracing::info!(addr = %config.listen_addr, "Prometheus metrics listener started");
    Ok(Some(handle))
}

/// Records one finished analysis.
///
/// `outcome` is `success` or an [`Error::kind`] label.
pub fn record_analysis(provider: &'static str, outcome: &'static str, elapsed: Duration) {
    metrics::counter!(
        "analysis_requests_total",
        "provider" => provider,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("analysis_duration_seconds", "provider" => provider)
        .record(elapsed.as_secs_f64());
}

fn parse_bool_env(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|value| {
        let value = value.to_lowercase();
        value == "true" || value == "1" || value == "yes"
    })
}

fn parse_port_env(key: &str) -> Option<u16> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registry_smoke() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_analysis("ollama", "success", Duration::from_millis(120));
            record_analysis("ollama", "provider", Duration::from_millis(5));
        });

        let rendered = handle.render();
        assert!(rendered.contains("analysis_requests_total"));
        assert!(rendered.contains("outcome=\"provider\""));
        assert!(rendered.contains("analysis_duration_seconds"));
    }

    #[test]
    fn test_disabled_installs_nothing() {
        let config = MetricsConfig {
            enabled: false,
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
        };
        assert!(install_prometheus(&config, true).unwrap().is_none());
    }
}
