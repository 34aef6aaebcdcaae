//! Configuration sections: breaker, fault window, backend, telemetry, metrics.

use std::net::SocketAddr;

use domain::BreakerConfig;
use serde::{Deserialize, Serialize};

use super::default_true;

// ==============================
// Breaker Configuration
// ==============================

/// Circuit breaker thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerSection {
    /// Failures within the window that open the breaker (default: 5)
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Length of a failure streak in milliseconds (default: 10000)
    #[serde(default = "default_failure_window")]
    pub failure_window_ms: u64,

    /// Quiet period before a probe is allowed in milliseconds (default: 5000)
    #[serde(default = "default_recovery_timeout")]
    pub recovery_timeout_ms: u64,
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_failure_window() -> u64 {
    10_000
}

const fn default_recovery_timeout() -> u64 {
    5_000
}

impl Default for BreakerSection {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            failure_window_ms: default_failure_window(),
            recovery_timeout_ms: default_recovery_timeout(),
        }
    }
}

impl From<BreakerSection> for BreakerConfig {
    fn from(section: BreakerSection) -> Self {
        Self {
            failure_threshold: section.failure_threshold,
            failure_window_ms: section.failure_window_ms,
            recovery_timeout_ms: section.recovery_timeout_ms,
        }
    }
}

// ==============================
// Fault Window Configuration
// ==============================

/// Slice of the run during which latency is forced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultWindowSection {
    /// Enable fault injection
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Window start, relative to test start (default: 30000)
    #[serde(default = "default_fault_start")]
    pub start_offset_ms: u64,

    /// Window end, inclusive (default: 90000)
    #[serde(default = "default_fault_end")]
    pub end_offset_ms: u64,

    /// Delay forced onto each call inside the window (default: 2000)
    #[serde(default = "default_fault_delay")]
    pub delay_ms: u64,
}

const fn default_fault_start() -> u64 {
    30_000
}

const fn default_fault_end() -> u64 {
    90_000
}

const fn default_fault_delay() -> u64 {
    2_000
}

impl Default for FaultWindowSection {
    fn default() -> Self {
        Self {
            enabled: true,
            start_offset_ms: default_fault_start(),
            end_offset_ms: default_fault_end(),
            delay_ms: default_fault_delay(),
        }
    }
}

// ==============================
// Backend Configuration
// ==============================

/// Where the tested services live and how long calls may take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSection {
    /// Base URL shared by the REST service and the RPC gateway
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call deadline in milliseconds (default: 30000)
    #[serde(default = "default_call_timeout")]
    pub call_timeout_ms: u64,

    /// Deadline for a reconnect in milliseconds (default: 10000)
    #[serde(default = "default_reconnect_timeout")]
    pub reconnect_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

const fn default_call_timeout() -> u64 {
    30_000
}

const fn default_reconnect_timeout() -> u64 {
    10_000
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            call_timeout_ms: default_call_timeout(),
            reconnect_timeout_ms: default_reconnect_timeout(),
        }
    }
}

// ==============================
// Telemetry Configuration
// ==============================

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySection {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
        }
    }
}

// ==============================
// Metrics Configuration
// ==============================

/// Metrics export settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSection {
    /// Serve a Prometheus endpoint on this address when set
    #[serde(default)]
    pub prometheus_address: Option<SocketAddr>,
}
