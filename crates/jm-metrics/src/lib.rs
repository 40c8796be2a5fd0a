use std::sync::OnceLock;

use metrics::{describe_counter, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

pub const METRICS_PORT_ENV: &str = "JM_METRICS_PORT";
pub const DEFAULT_METRICS_PORT: u16 = 9102;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn resolve_port(raw: Option<String>, default_port: u16) -> u16 {
    raw.and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(default_port)
}

fn describe_matching_metrics() {
    describe_counter!(
        "jm_rank_pairs_total",
        Unit::Count,
        "Pairs seen by ranking passes, by direction and outcome"
    );
    describe_counter!(
        "jm_rank_timeouts_total",
        Unit::Count,
        "Ranking passes aborted by the scan deadline"
    );
}

/// Starts the Prometheus exporter on `0.0.0.0:<port>` once per process.
///
/// The port comes from the `port_env` variable, falling back to
/// `default_port`. A failed start is logged and leaves metrics disabled.
pub fn init_metrics(port_env: &str, default_port: u16) -> Option<&'static PrometheusHandle> {
    if let Some(existing) = PROMETHEUS_HANDLE.get() {
        return Some(existing);
    }

    let port = resolve_port(std::env::var(port_env).ok(), default_port);
    match PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install_recorder()
    {
        Ok(handle) => {
            let _ = PROMETHEUS_HANDLE.set(handle);
            describe_matching_metrics();
            info!(metrics_port = port, "started prometheus exporter");
        }
        Err(err) => {
            warn!(error = %err, metrics_port = port, "failed to start prometheus exporter");
        }
    }
    PROMETHEUS_HANDLE.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_to_default() {
        assert_eq!(resolve_port(None, DEFAULT_METRICS_PORT), 9102);
        assert_eq!(resolve_port(Some("not-a-port".into()), 9102), 9102);
        assert_eq!(resolve_port(Some(" 9200 ".into()), 9102), 9200);
    }
}
