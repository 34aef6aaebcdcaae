//! Named metrics emitted by the resilience engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a metric aggregates its values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonic count
    Counter,
    /// Sample distribution
    Distribution,
}

/// Metric names with fixed semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResilienceMetric {
    /// Every classified failure
    Errors,
    /// Every fallback response served
    Fallbacks,
    /// Every request served without a genuine backend round trip
    DegradedRequests,
    /// Milliseconds from half-open entry to closing, one sample per recovery
    RecoveryTime,
    /// Percent below baseline throughput, one sample per degraded window
    ThroughputDegradation,
}

impl ResilienceMetric {
    /// All metrics
    pub const ALL: [Self; 5] = [
        Self::Errors,
        Self::Fallbacks,
        Self::DegradedRequests,
        Self::RecoveryTime,
        Self::ThroughputDegradation,
    ];

    /// Exported metric name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Errors => "errors",
            Self::Fallbacks => "fallbacks",
            Self::DegradedRequests => "degraded_requests",
            Self::RecoveryTime => "recovery_time",
            Self::ThroughputDegradation => "throughput_degradation",
        }
    }

    /// Aggregation kind
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        match self {
            Self::Errors | Self::Fallbacks | Self::DegradedRequests => MetricKind::Counter,
            Self::RecoveryTime | Self::ThroughputDegradation => MetricKind::Distribution,
        }
    }
}

impl fmt::Display for ResilienceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
