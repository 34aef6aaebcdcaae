//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod circuit_breaker;
mod clock;
mod fallback_responder;
mod http_backend;
mod metrics_recorder;
mod throughput_monitor;

pub use circuit_breaker::CircuitBreaker;
pub use clock::{ManualClock, SystemClock};
pub use fallback_responder::{FallbackConfig, FallbackPayload, FallbackResponder, FallbackStats};
pub use http_backend::{GRPC_GATEWAY_PROCESS_PATH, HttpBackend, REST_PROCESS_PATH, X_PROTOCOL};
pub use metrics_recorder::{MetricsError, MetricsRecorder, install_prometheus_exporter};
pub use throughput_monitor::{DEFAULT_THROUGHPUT_WINDOW_MS, ThroughputMonitor};
