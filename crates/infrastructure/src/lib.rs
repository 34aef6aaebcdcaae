//! Infrastructure layer - Adapters for the resilience engine
//!
//! Implements ports defined in the application layer: the circuit breaker,
//! fault injection, fallback, throughput monitoring, HTTP backends, clocks
//! and metrics. Also hosts configuration loading and logging setup.

pub mod adapters;
pub mod chaos;
pub mod config;
pub mod http;
pub mod simulation;
pub mod telemetry;

pub use adapters::*;
pub use chaos::{FaultInjector, FaultInjectorConfig, FaultPolicy};
pub use config::{ConfigError, SimulationConfig};
pub use http::{ConnectionSlot, HttpClientConfig, X_REQUEST_ID};
pub use simulation::build_probe;
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
