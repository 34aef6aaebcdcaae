//! Circuit breaker port

use domain::{BreakerSnapshot, CircuitState, RecoveryEvent};
#[cfg(test)]
use mockall::automock;

/// Port for the breaker gating real backend calls
///
/// A single logical breaker is shared by every worker, so implementations
/// must serialize all reads and writes of their runtime state.
#[cfg_attr(test, automock)]
pub trait CircuitBreakerPort: Send + Sync {
    /// Whether a real call may be attempted now
    fn allow(&self) -> bool;

    /// Record the classified outcome of a real call
    ///
    /// Returns the recovery event when the outcome closed a half-open breaker.
    fn record(&self, succeeded: bool) -> Option<RecoveryEvent>;

    /// Current state
    fn state(&self) -> CircuitState;

    /// Current runtime state
    fn snapshot(&self) -> BreakerSnapshot;
}
