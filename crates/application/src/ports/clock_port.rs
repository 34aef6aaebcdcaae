//! Clock port

#[cfg(test)]
use mockall::automock;

/// Source of wall-clock time in milliseconds
#[cfg_attr(test, automock)]
pub trait ClockPort: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;
}
