//! HTTP backends for the REST service and the RPC service's gateway
//!
//! Both protocols are reached over HTTP: the REST service directly, the
//! streaming-RPC service through its JSON gateway. They differ only in path
//! and headers, so one adapter covers both.

use std::collections::HashMap;
use std::sync::Arc;

use application::ApplicationError;
use application::ports::{BackendPort, BackendResponse};
use async_trait::async_trait;
use domain::{ProbeRequest, Protocol};
use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::http::{ConnectionSlot, with_request_id};

/// Path of the REST processing endpoint
pub const REST_PROCESS_PATH: &str = "/api/process";

/// Path of the RPC gateway processing endpoint
pub const GRPC_GATEWAY_PROCESS_PATH: &str = "/grpc/process";

/// Header telling the gateway which protocol the caller speaks
pub const X_PROTOCOL: &str = "x-protocol";

/// Backend adapter over the shared connection slot
///
/// An in-flight call is tracked with the client generation it runs on, keyed
/// by its request identifier. A successful call drops the entry; a failed or
/// cancelled one keeps it until the matching [`BackendPort::reconnect`].
#[derive(Debug)]
pub struct HttpBackend {
    protocol: Protocol,
    url: String,
    slot: Arc<ConnectionSlot>,
    in_flight: Mutex<HashMap<String, u64>>,
}

impl HttpBackend {
    /// REST backend at `base_url`
    pub fn rest(base_url: &str, slot: Arc<ConnectionSlot>) -> Self {
        Self::new(Protocol::Rest, base_url, slot)
    }

    /// RPC backend reached through its HTTP gateway at `base_url`
    pub fn grpc_gateway(base_url: &str, slot: Arc<ConnectionSlot>) -> Self {
        Self::new(Protocol::Grpc, base_url, slot)
    }

    /// Backend for `protocol` at `base_url`
    pub fn new(protocol: Protocol, base_url: &str, slot: Arc<ConnectionSlot>) -> Self {
        let path = match protocol {
            Protocol::Rest => REST_PROCESS_PATH,
            Protocol::Grpc => GRPC_GATEWAY_PROCESS_PATH,
        };
        Self {
            protocol,
            url: format!("{}{path}", base_url.trim_end_matches('/')),
            slot,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, err: &reqwest::Error) -> ApplicationError {
        if err.is_timeout() {
            ApplicationError::Timeout(self.slot.config().timeout)
        } else {
            ApplicationError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl BackendPort for HttpBackend {
    #[instrument(skip(self, request), fields(protocol = %self.protocol, data = %request.data))]
    async fn call(&self, request: &ProbeRequest) -> Result<BackendResponse, ApplicationError> {
        let (client, generation) = self.slot.client().await;
        self.in_flight.lock().insert(request.data.clone(), generation);
        let mut builder = client.post(&self.url).json(request);
        if self.protocol == Protocol::Grpc {
            builder = builder.header(X_PROTOCOL, "grpc");
        }
        let (builder, request_id) = with_request_id(builder);

        let response = builder
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&e))?;
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

        self.in_flight.lock().remove(&request.data);
        debug!(%request_id, status, "Backend responded");
        Ok(BackendResponse::new(status, body))
    }

    async fn reconnect(&self, failed: &ProbeRequest) -> Result<(), ApplicationError> {
        let observed = self.in_flight.lock().remove(&failed.data);
        // no entry when `failed` never went through this backend
        let performed = match observed {
            Some(generation) => self.slot.reconnect_from(generation).await?,
            None => self.slot.reconnect().await?,
        };
        debug!(protocol = %self.protocol, performed, "Reconnect finished");
        Ok(())
    }

    fn protocol(&self) -> Protocol {
        self.protocol
    }
}
