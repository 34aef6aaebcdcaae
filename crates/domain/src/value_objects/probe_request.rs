//! Request payload sent to a tested backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Protocol;

/// Payload of a single backend call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRequest {
    /// Identifier of the form `{prefix}-{worker}-{iteration}`
    pub data: String,
    /// When the request was built
    pub timestamp: DateTime<Utc>,
    /// Scenario tag understood by the backend
    pub test_type: String,
}

impl ProbeRequest {
    /// Build the payload for one worker iteration
    #[must_use]
    pub fn for_iteration(protocol: Protocol, worker: u64, iteration: u64) -> Self {
        Self::at(protocol, worker, iteration, Utc::now())
    }

    /// Build the payload with an explicit timestamp
    #[must_use]
    pub fn at(protocol: Protocol, worker: u64, iteration: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            data: format!("{}-{worker}-{iteration}", protocol.request_prefix()),
            timestamp,
            test_type: protocol.test_type().to_string(),
        }
    }
}
