//! Application services - Use case implementations

mod load_driver;
mod resilience_probe;

pub use load_driver::{LoadDriver, LoadSettings, RunSummary};
pub use resilience_probe::{
    DEFAULT_CALL_TIMEOUT_MS, DEFAULT_SLOW_CALL_THRESHOLD_MS, ProbePorts, ProbeSettings,
    ResilienceProbe,
};
