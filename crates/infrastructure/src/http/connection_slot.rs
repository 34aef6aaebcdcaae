//! Shared connection slot
//!
//! Holds the HTTP client used by every worker plus a generation number.
//! Reconnects take the write lock; a worker that waited while another one
//! reconnected sees the generation move and skips its own attempt.

use std::time::Duration;

use application::ApplicationError;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{HttpClientConfig, build_client};

#[derive(Debug)]
struct SlotState {
    client: Client,
    generation: u64,
}

/// Client handle shared by all workers of a run
#[derive(Debug)]
pub struct ConnectionSlot {
    config: HttpClientConfig,
    reconnect_timeout: Duration,
    state: RwLock<SlotState>,
}

impl ConnectionSlot {
    /// Establish the initial client
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn new(config: HttpClientConfig, reconnect_timeout: Duration) -> Result<Self, ApplicationError> {
        let client = build_client(&config)
            .map_err(|e| ApplicationError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self {
            config,
            reconnect_timeout,
            state: RwLock::new(SlotState {
                client,
                generation: 0,
            }),
        })
    }

    /// Client configuration
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Current client and the generation it belongs to
    ///
    /// Cloning the client shares its connection pool.
    pub async fn client(&self) -> (Client, u64) {
        let state = self.state.read().await;
        (state.client.clone(), state.generation)
    }

    /// Number of completed reconnects
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Replace whatever client is current when the call starts
    ///
    /// Returns `true` when this call performed the reconnect.
    pub async fn reconnect(&self) -> Result<bool, ApplicationError> {
        let observed = self.generation().await;
        self.reconnect_from(observed).await
    }

    /// Replace the client a call failed on, unless it is already gone
    ///
    /// `observed` is the generation returned by [`Self::client`] for the
    /// failed call. Returns `false` when another worker reconnected since.
    pub async fn reconnect_from(&self, observed: u64) -> Result<bool, ApplicationError> {
        let mut state = tokio::time::timeout(self.reconnect_timeout, self.state.write())
            .await
            .map_err(|_| ApplicationError::Timeout(self.reconnect_timeout))?;

        if state.generation != observed {
            debug!(
                generation = state.generation,
                "Connection already re-established by another worker"
            );
            return Ok(false);
        }

        state.client = build_client(&self.config)
            .map_err(|e| ApplicationError::Transport(format!("reconnect failed: {e}")))?;
        state.generation += 1;
        info!(generation = state.generation, "Connection re-established");
        Ok(true)
    }
}
