//! Metrics recorder
//!
//! Keeps in-memory totals for the run summary and forwards every emission to
//! the `metrics` facade, so an installed exporter sees the same numbers.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use application::ports::{DistributionSummary, MetricsPort, MetricsSnapshot};
use domain::{MetricKind, Protocol, ResilienceMetric};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while installing the Prometheus exporter
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Exporter could not be built or installed
    #[error("Failed to install Prometheus exporter: {0}")]
    Install(String),
}

/// Install a Prometheus exporter serving `/metrics` on `address`
///
/// Must run inside a Tokio runtime and before any metric is recorded.
pub fn install_prometheus_exporter(address: SocketAddr) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(address)
        // recovery time in milliseconds
        .set_buckets_for_metric(
            Matcher::Full(ResilienceMetric::RecoveryTime.name().to_string()),
            &[
                10.0, 50.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 10_000.0, 30_000.0,
            ],
        )
        .map_err(|e| MetricsError::Install(e.to_string()))?
        // degradation in percent
        .set_buckets_for_metric(
            Matcher::Full(ResilienceMetric::ThroughputDegradation.name().to_string()),
            &[1.0, 5.0, 10.0, 20.0, 30.0, 40.0, 50.0, 75.0, 90.0, 100.0],
        )
        .map_err(|e| MetricsError::Install(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    info!(%address, "Prometheus exporter listening");
    Ok(())
}

#[derive(Debug, Default)]
struct Samples {
    recovery_time: Vec<f64>,
    throughput_degradation: Vec<f64>,
}

fn summarize(samples: &[f64]) -> DistributionSummary {
    if samples.is_empty() {
        return DistributionSummary::default();
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let max = samples.iter().copied().fold(f64::MIN, f64::max);
    DistributionSummary {
        count: samples.len() as u64,
        mean,
        max,
    }
}

/// `MetricsPort` adapter with atomic counters and sample vectors
#[derive(Debug)]
pub struct MetricsRecorder {
    protocol: Option<Protocol>,
    errors: AtomicU64,
    fallbacks: AtomicU64,
    degraded_requests: AtomicU64,
    samples: Mutex<Samples>,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    /// Create a recorder without a protocol label
    #[must_use]
    pub fn new() -> Self {
        Self {
            protocol: None,
            errors: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
            degraded_requests: AtomicU64::new(0),
            samples: Mutex::new(Samples::default()),
        }
    }

    /// Create a recorder that labels facade emissions with `protocol`
    #[must_use]
    pub fn for_protocol(protocol: Protocol) -> Self {
        Self {
            protocol: Some(protocol),
            ..Self::new()
        }
    }

    fn label(&self) -> &'static str {
        match self.protocol {
            Some(Protocol::Rest) => "rest",
            Some(Protocol::Grpc) => "grpc",
            None => "unknown",
        }
    }

    const fn counter_for(&self, metric: ResilienceMetric) -> Option<&AtomicU64> {
        match metric {
            ResilienceMetric::Errors => Some(&self.errors),
            ResilienceMetric::Fallbacks => Some(&self.fallbacks),
            ResilienceMetric::DegradedRequests => Some(&self.degraded_requests),
            ResilienceMetric::RecoveryTime | ResilienceMetric::ThroughputDegradation => None,
        }
    }
}

impl MetricsPort for MetricsRecorder {
    fn increment(&self, metric: ResilienceMetric) {
        let Some(total) = self.counter_for(metric) else {
            debug!(metric = %metric, "Ignoring increment of distribution metric");
            return;
        };
        total.fetch_add(1, Ordering::Relaxed);
        counter!(metric.name(), "protocol" => self.label()).increment(1);
    }

    fn observe(&self, metric: ResilienceMetric, value: f64) {
        if metric.kind() != MetricKind::Distribution {
            debug!(metric = %metric, "Ignoring sample of counter metric");
            return;
        }
        {
            let mut samples = self.samples.lock();
            match metric {
                ResilienceMetric::RecoveryTime => samples.recovery_time.push(value),
                _ => samples.throughput_degradation.push(value),
            }
        }
        histogram!(metric.name(), "protocol" => self.label()).record(value);
    }

    fn snapshot(&self) -> MetricsSnapshot {
        let samples = self.samples.lock();
        MetricsSnapshot {
            errors: self.errors.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            degraded_requests: self.degraded_requests.load(Ordering::Relaxed),
            recovery_time: summarize(&samples.recovery_time),
            throughput_degradation: summarize(&samples.throughput_degradation),
        }
    }
}
