//! Circuit breaker vocabulary
//!
//! The state machine itself lives in the infrastructure layer; these are the
//! values it is configured with and the values it reports.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// State of a circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation, calls pass through
    #[default]
    Closed,
    /// Backend assumed down, calls are short-circuited to fallback
    Open,
    /// Testing recovery with a single probe call
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Configuration for a circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Failures within the window needed to open the circuit
    pub failure_threshold: u32,
    /// Maximum spread between the first and last failure of a streak
    pub failure_window_ms: u64,
    /// Time the circuit stays open after the last failure
    pub recovery_timeout_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            failure_window_ms: 10_000,
            recovery_timeout_ms: 5_000,
        }
    }
}

impl BreakerConfig {
    /// Creates a validated configuration
    pub fn new(
        failure_threshold: u32,
        failure_window_ms: u64,
        recovery_timeout_ms: u64,
    ) -> Result<Self, DomainError> {
        let config = Self {
            failure_threshold,
            failure_window_ms,
            recovery_timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the breaker invariants
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.failure_threshold == 0 {
            return Err(DomainError::invalid_config(
                "failure_threshold",
                "must be greater than 0",
            ));
        }
        if self.recovery_timeout_ms == 0 {
            return Err(DomainError::invalid_config(
                "recovery_timeout_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Point-in-time view of a breaker's runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    /// Current state
    pub state: CircuitState,
    /// Failures counted in the current streak (or since opening)
    pub failure_count: u32,
    /// Timestamp of the most recent failure
    pub last_failure_time_ms: Option<u64>,
    /// Timestamp of the most recent half-open entry
    pub recovery_started_at_ms: Option<u64>,
    /// Number of OPEN to CLOSED recoveries so far
    pub recoveries: u64,
    /// Number of CLOSED to OPEN trips so far
    pub trips: u64,
}

/// Emitted once per OPEN → HALF_OPEN → CLOSED recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryEvent {
    /// When the breaker last went OPEN
    pub tripped_at_ms: u64,
    /// When the recovery attempt opened (half-open entry)
    pub opened_at_ms: u64,
    /// When the successful probe closed the breaker
    pub closed_at_ms: u64,
}

impl RecoveryEvent {
    /// Time from half-open entry to closing
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.closed_at_ms.saturating_sub(self.opened_at_ms)
    }

    /// Total time the backend was shielded by the breaker
    #[must_use]
    pub const fn outage_ms(&self) -> u64 {
        self.closed_at_ms.saturating_sub(self.tripped_at_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_state_display() {
        assert_eq!(format!("{}", CircuitState::Closed), "closed");
        assert_eq!(format!("{}", CircuitState::Open), "open");
        assert_eq!(format!("{}", CircuitState::HalfOpen), "half-open");
    }

    #[test]
    fn circuit_state_serde() {
        let json = serde_json::to_string(&CircuitState::HalfOpen).unwrap();
        assert_eq!(json, "\"HALF_OPEN\"");
    }

    #[test]
    fn config_default() {
        let config = BreakerConfig::default();
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.failure_window_ms, 10_000);
        assert_eq!(config.recovery_timeout_ms, 5_000);
    }

    #[test]
    fn config_rejects_zero_threshold() {
        let err = BreakerConfig::new(0, 10_000, 5_000).unwrap_err();
        assert!(err.to_string().contains("failure_threshold"));
    }

    #[test]
    fn config_rejects_zero_recovery_timeout() {
        let err = BreakerConfig::new(5, 10_000, 0).unwrap_err();
        assert!(err.to_string().contains("recovery_timeout_ms"));
    }

    #[test]
    fn recovery_event_durations() {
        let event = RecoveryEvent {
            tripped_at_ms: 1_000,
            opened_at_ms: 7_000,
            closed_at_ms: 7_250,
        };
        assert_eq!(event.duration_ms(), 250);
        assert_eq!(event.outage_ms(), 6_250);
    }

    #[test]
    fn recovery_event_duration_never_negative() {
        let event = RecoveryEvent {
            tripped_at_ms: 10,
            opened_at_ms: 10,
            closed_at_ms: 5,
        };
        assert_eq!(event.duration_ms(), 0);
    }
}
