//! Prometheus wiring for the `metrics` facade.
//!
//! The recorder is process-global by nature of the `metrics` crate, so it is
//! installed at most once; the handle is kept for rendering `/metrics`.

use matcher::{MatchMetrics, MatchOperation};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder if it is not installed yet.
pub fn install_recorder() -> Option<&'static PrometheusHandle> {
    match PROMETHEUS.get_or_try_init(|| PrometheusBuilder::new().install_recorder()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::warn!(error = %err, "failed to install prometheus recorder");
            None
        }
    }
}

/// Render the current metrics snapshot in Prometheus text format.
pub fn render() -> Option<String> {
    PROMETHEUS.get().map(PrometheusHandle::render)
}

/// Forwards matcher measurements to the `metrics` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusMatchMetrics;

impl MatchMetrics for PrometheusMatchMetrics {
    fn record_match(
        &self,
        operation: MatchOperation,
        latency: Duration,
        comparisons: usize,
        hits: usize,
    ) {
        let op = operation.as_str();
        metrics::counter!("finditback_match_runs_total", "operation" => op).increment(1);
        metrics::counter!("finditback_match_comparisons_total", "operation" => op)
            .increment(comparisons as u64);
        metrics::counter!("finditback_match_hits_total", "operation" => op)
            .increment(hits as u64);
        metrics::histogram!("finditback_match_latency_seconds", "operation" => op)
            .record(latency.as_secs_f64());
    }
}
