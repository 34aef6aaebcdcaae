//! Fallback responder
//!
//! Serves a synthetic degraded response while the breaker keeps the backend
//! out of the call path. A fallback is a deliberate graceful degradation, so
//! its sample is always successful and never counted as an error.

use std::sync::Arc;

use application::ports::{ClockPort, FallbackPort, MetricsPort};
use chrono::{DateTime, Utc};
use domain::{Protocol, ResilienceMetric, ResultSample};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for fallback responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Message carried in the synthetic payload
    #[serde(default = "default_message")]
    pub message: String,

    /// Nominal overhead of a REST fallback (milliseconds)
    #[serde(default = "default_rest_duration")]
    pub rest_duration_ms: u64,

    /// Nominal overhead of an RPC fallback (milliseconds)
    #[serde(default = "default_rpc_duration")]
    pub rpc_duration_ms: u64,
}

fn default_message() -> String {
    "Service temporarily unavailable - serving fallback response".to_string()
}

const fn default_rest_duration() -> u64 {
    100
}

const fn default_rpc_duration() -> u64 {
    150
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            message: default_message(),
            rest_duration_ms: default_rest_duration(),
            rpc_duration_ms: default_rpc_duration(),
        }
    }
}

impl FallbackConfig {
    /// Nominal duration for the given protocol
    pub const fn duration_for(&self, protocol: Protocol) -> u64 {
        match protocol {
            Protocol::Rest => self.rest_duration_ms,
            Protocol::Grpc => self.rpc_duration_ms,
        }
    }
}

/// Synthetic body a fallback stands in for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPayload {
    pub success: bool,
    pub message: String,
    pub degraded: bool,
    pub protocol: Protocol,
    pub timestamp: DateTime<Utc>,
}

/// Statistics for fallback operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackStats {
    /// Fallback responses served
    pub fallback_responses: u64,
    /// Requests served in degraded mode
    pub degraded_requests: u64,
}

/// Fallback adapter for one protocol
pub struct FallbackResponder {
    protocol: Protocol,
    config: FallbackConfig,
    clock: Arc<dyn ClockPort>,
    metrics: Arc<dyn MetricsPort>,
    stats: RwLock<FallbackStats>,
}

impl std::fmt::Debug for FallbackResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackResponder")
            .field("protocol", &self.protocol)
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl FallbackResponder {
    /// Create a new fallback responder
    pub fn new(
        protocol: Protocol,
        config: FallbackConfig,
        clock: Arc<dyn ClockPort>,
        metrics: Arc<dyn MetricsPort>,
    ) -> Self {
        Self {
            protocol,
            config,
            clock,
            metrics,
            stats: RwLock::new(FallbackStats::default()),
        }
    }

    /// Get fallback statistics
    pub fn stats(&self) -> FallbackStats {
        *self.stats.read()
    }

    /// Build the synthetic payload
    pub fn payload(&self) -> FallbackPayload {
        FallbackPayload {
            success: true,
            message: self.config.message.clone(),
            degraded: true,
            protocol: self.protocol,
            timestamp: Utc::now(),
        }
    }
}

impl FallbackPort for FallbackResponder {
    fn respond(&self) -> ResultSample {
        {
            let mut stats = self.stats.write();
            stats.fallback_responses += 1;
            stats.degraded_requests += 1;
        }
        self.metrics.increment(ResilienceMetric::Fallbacks);
        self.metrics.increment(ResilienceMetric::DegradedRequests);

        let duration_ms = self.config.duration_for(self.protocol);
        debug!(protocol = %self.protocol, duration_ms, "Serving fallback response");
        ResultSample::fallback(self.clock.now_ms(), duration_ms)
    }
}
