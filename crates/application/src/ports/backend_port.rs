//! Backend port - The capability to perform one call against a tested backend

use async_trait::async_trait;
use domain::{ProbeRequest, Protocol};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Response returned by a backend call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    /// Status code reported by the backend
    pub status: u16,
    /// Decoded response body (`Null` when the body was not JSON)
    pub body: serde_json::Value,
}

impl BackendResponse {
    /// Create a response
    #[must_use]
    pub const fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Whether the backend reported success
    ///
    /// Requires status 200 and either `success: true` or `status: "success"`
    /// in the body.
    #[must_use]
    pub fn indicates_success(&self) -> bool {
        if self.status != 200 {
            return false;
        }
        let flagged = self
            .body
            .get("success")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        let status_field = self.body.get("status").and_then(serde_json::Value::as_str)
            == Some("success");
        flagged || status_field
    }
}

/// Port for calling a tested backend
///
/// REST and RPC backends are two implementations of this port, so the
/// probe never needs to know which protocol it is driving.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BackendPort: Send + Sync {
    /// Perform one call
    ///
    /// Returns `Err` only when the call itself could not complete. A
    /// non-success answer is returned as `Ok` and classified by the caller.
    async fn call(&self, request: &ProbeRequest) -> Result<BackendResponse, ApplicationError>;

    /// Re-establish the transport that `failed` was sent on
    ///
    /// Does nothing when another caller already replaced that transport.
    async fn reconnect(&self, failed: &ProbeRequest) -> Result<(), ApplicationError>;

    /// Protocol this backend speaks
    fn protocol(&self) -> Protocol;
}
