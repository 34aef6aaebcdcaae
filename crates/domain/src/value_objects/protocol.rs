//! Transport protocol under test

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// Transport protocol of a tested backend
///
/// The simulator compares a request/response style backend with a
/// streaming RPC style backend reached through its HTTP gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain REST endpoint
    #[default]
    Rest,
    /// Streaming RPC service behind a gateway
    Grpc,
}

impl Protocol {
    /// All protocols, in the order they are compared
    pub const ALL: [Self; 2] = [Self::Rest, Self::Grpc];

    /// Prefix used for request payload identifiers
    #[must_use]
    pub const fn request_prefix(&self) -> &'static str {
        match self {
            Self::Rest => "resilience-test",
            Self::Grpc => "grpc-resilience-test",
        }
    }

    /// Test type tag sent to the backend
    #[must_use]
    pub const fn test_type(&self) -> &'static str {
        match self {
            Self::Rest => "resilience",
            Self::Grpc => "resilience_grpc",
        }
    }

    /// Get a human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Rest => "REST",
            Self::Grpc => "gRPC",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => write!(f, "rest"),
            Self::Grpc => write!(f, "grpc"),
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rest" | "http" => Ok(Self::Rest),
            "grpc" | "rpc" => Ok(Self::Grpc),
            _ => Err(DomainError::UnknownProtocol(s.to_string())),
        }
    }
}
