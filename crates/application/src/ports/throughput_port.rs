//! Throughput monitoring port

use domain::{ThroughputRoll, ThroughputWindow};
#[cfg(test)]
use mockall::automock;

/// Port tracking request rate against the startup baseline
///
/// Called concurrently by every worker.
#[cfg_attr(test, automock)]
pub trait ThroughputPort: Send + Sync {
    /// Count one request in the current window
    fn tick(&self);

    /// Close the current window if its interval has elapsed
    fn maybe_roll(&self, now_ms: u64) -> Option<ThroughputRoll>;

    /// Current window state
    fn snapshot(&self) -> ThroughputWindow;
}
