//! Per-iteration result sample

use serde::{Deserialize, Serialize};

/// Outcome of a single probe iteration
///
/// Exactly one sample is produced per iteration, whatever happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSample {
    /// When the iteration finished (epoch milliseconds)
    pub timestamp_ms: u64,
    /// Classified outcome
    pub succeeded: bool,
    /// Duration of the backend call, or the nominal fallback overhead
    pub duration_ms: u64,
    /// A synthetic delay was forced on this iteration
    pub forced_fault: bool,
    /// Served by the fallback responder
    pub was_fallback: bool,
}

impl ResultSample {
    /// Sample for a real backend call
    #[must_use]
    pub const fn call(
        timestamp_ms: u64,
        succeeded: bool,
        duration_ms: u64,
        forced_fault: bool,
    ) -> Self {
        Self {
            timestamp_ms,
            succeeded,
            duration_ms,
            forced_fault,
            was_fallback: false,
        }
    }

    /// Sample for a fallback response, always successful
    #[must_use]
    pub const fn fallback(timestamp_ms: u64, duration_ms: u64) -> Self {
        Self {
            timestamp_ms,
            succeeded: true,
            duration_ms,
            forced_fault: false,
            was_fallback: true,
        }
    }

    /// Whether this sample counts against the `errors` metric
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !self.succeeded && !self.was_fallback
    }
}
