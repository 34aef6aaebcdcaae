//! Value Objects - Immutable, identity-less domain primitives

mod fault_window;
mod probe_request;
mod protocol;
mod resilience_metric;

pub use fault_window::FaultWindow;
pub use probe_request::ProbeRequest;
pub use protocol::Protocol;
pub use resilience_metric::{MetricKind, ResilienceMetric};
