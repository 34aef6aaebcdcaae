//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// A configuration value violates a domain invariant
    #[error("Invalid {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Fault window bounds are reversed
    #[error("Invalid fault window: start {start_ms}ms is after end {end_ms}ms")]
    InvalidFaultWindow { start_ms: u64, end_ms: u64 },

    /// Unknown protocol name
    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),
}

impl DomainError {
    /// Create an invalid configuration error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
