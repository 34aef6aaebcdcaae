//! Metrics port - Named metric emissions

use domain::ResilienceMetric;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

/// Aggregate of a distribution metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Number of samples
    pub count: u64,
    /// Mean of all samples (0 when empty)
    pub mean: f64,
    /// Largest sample (0 when empty)
    pub max: f64,
}

/// Totals of every resilience metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// `errors` counter
    pub errors: u64,
    /// `fallbacks` counter
    pub fallbacks: u64,
    /// `degraded_requests` counter
    pub degraded_requests: u64,
    /// `recovery_time` distribution (ms)
    pub recovery_time: DistributionSummary,
    /// `throughput_degradation` distribution (%)
    pub throughput_degradation: DistributionSummary,
}

/// Port for emitting resilience metrics
#[cfg_attr(test, automock)]
pub trait MetricsPort: Send + Sync {
    /// Increment a counter metric by one
    fn increment(&self, metric: ResilienceMetric);

    /// Record one sample of a distribution metric
    fn observe(&self, metric: ResilienceMetric, value: f64);

    /// Totals recorded so far
    fn snapshot(&self) -> MetricsSnapshot;
}
