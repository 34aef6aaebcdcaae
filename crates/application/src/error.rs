//! Application-level errors

use std::time::Duration;

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backend call could not complete
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend call exceeded its deadline
    #[error("Call timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether the error means the transport should be re-established
    pub const fn needs_reconnect(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}
