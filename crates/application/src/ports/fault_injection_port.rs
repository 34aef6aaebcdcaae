//! Fault injection port

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Port deciding whether an iteration suffers a forced fault
///
/// The decision is a pure function of elapsed test time. The caller applies
/// the delay; implementations never sleep.
#[cfg_attr(test, automock)]
pub trait FaultInjectionPort: Send + Sync {
    /// Whether a fault applies at `elapsed_ms` after test start
    fn should_inject_fault(&self, elapsed_ms: u64) -> bool;

    /// Delay the caller must apply when a fault is injected
    fn injected_delay(&self) -> Duration;
}
