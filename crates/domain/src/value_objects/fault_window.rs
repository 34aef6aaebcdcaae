//! Fault window value object

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::DomainError;

/// Time window during which a synthetic delay is forced on every call
///
/// Offsets are relative to the test start captured once at setup.
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultWindow {
    /// Window start, milliseconds after test start
    pub start_offset_ms: u64,
    /// Window end, milliseconds after test start
    pub end_offset_ms: u64,
    /// Delay applied to calls inside the window
    pub injected_delay_ms: u64,
}

impl FaultWindow {
    /// Create a validated fault window
    pub const fn new(
        start_offset_ms: u64,
        end_offset_ms: u64,
        injected_delay_ms: u64,
    ) -> Result<Self, DomainError> {
        if start_offset_ms > end_offset_ms {
            return Err(DomainError::InvalidFaultWindow {
                start_ms: start_offset_ms,
                end_ms: end_offset_ms,
            });
        }
        Ok(Self {
            start_offset_ms,
            end_offset_ms,
            injected_delay_ms,
        })
    }

    /// Whether `elapsed_ms` falls inside `[start, end]`
    #[must_use]
    pub const fn contains(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.start_offset_ms && elapsed_ms <= self.end_offset_ms
    }

    /// The delay to apply as a `Duration`
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.injected_delay_ms)
    }
}

impl Default for FaultWindow {
    fn default() -> Self {
        Self {
            start_offset_ms: 30_000,
            end_offset_ms: 90_000,
            injected_delay_ms: 2_000,
        }
    }
}
