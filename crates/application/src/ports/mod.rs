//! Port definitions for application layer
//!
//! Ports are interfaces that define how the resilience engine interacts with
//! its collaborators. Adapters in the infrastructure layer implement these ports.

mod backend_port;
mod circuit_breaker_port;
mod clock_port;
mod fallback_port;
mod fault_injection_port;
mod metrics_port;
mod throughput_port;

pub use backend_port::{BackendPort, BackendResponse};
#[cfg(test)]
pub use backend_port::MockBackendPort;
pub use circuit_breaker_port::CircuitBreakerPort;
#[cfg(test)]
pub use circuit_breaker_port::MockCircuitBreakerPort;
pub use clock_port::ClockPort;
#[cfg(test)]
pub use clock_port::MockClockPort;
pub use fallback_port::FallbackPort;
#[cfg(test)]
pub use fallback_port::MockFallbackPort;
pub use fault_injection_port::FaultInjectionPort;
#[cfg(test)]
pub use fault_injection_port::MockFaultInjectionPort;
pub use metrics_port::{DistributionSummary, MetricsPort, MetricsSnapshot};
#[cfg(test)]
pub use metrics_port::MockMetricsPort;
pub use throughput_port::ThroughputPort;
#[cfg(test)]
pub use throughput_port::MockThroughputPort;
