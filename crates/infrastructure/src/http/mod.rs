//! HTTP plumbing for the tested backends
//!
//! Outgoing calls carry an `x-request-id` correlation header. Every backend
//! of a run shares one [`ConnectionSlot`] so reconnects are serialized.

mod client;
mod connection_slot;

pub use client::{HttpClientConfig, X_REQUEST_ID, build_client, with_request_id};
pub use connection_slot::ConnectionSlot;
