//! Entities - Domain objects describing breaker, sample and throughput state

mod circuit;
mod result_sample;
mod throughput;

pub use circuit::{BreakerConfig, BreakerSnapshot, CircuitState, RecoveryEvent};
pub use result_sample::ResultSample;
pub use throughput::{ThroughputRoll, ThroughputWindow, degradation_pct};
