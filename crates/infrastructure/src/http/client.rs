//! HTTP client construction with request ID correlation

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Header name for request correlation ID
pub const X_REQUEST_ID: &str = "x-request-id";

/// Configuration for backend HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            user_agent: format!("resilience-sim/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Build a fresh client (and with it a fresh connection pool)
///
/// # Errors
///
/// Returns an error if the underlying reqwest client cannot be built.
pub fn build_client(config: &HttpClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.timeout)
        .user_agent(&config.user_agent)
        .build()
}

/// Attach a new correlation ID to a request
pub fn with_request_id(builder: RequestBuilder) -> (RequestBuilder, Uuid) {
    let request_id = Uuid::new_v4();
    debug!(request_id = %request_id, "Sending correlated HTTP request");
    (builder.header(X_REQUEST_ID, request_id.to_string()), request_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = HttpClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("resilience-sim/"));
    }

    #[test]
    fn config_builders() {
        let config = HttpClientConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(1));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
    }

    #[test]
    fn client_builds() {
        assert!(build_client(&HttpClientConfig::default()).is_ok());
    }

    #[test]
    fn request_id_header_is_attached() {
        let client = build_client(&HttpClientConfig::default()).unwrap();
        let (builder, id) = with_request_id(client.post("http://localhost/api/process"));
        let request = builder.build().unwrap();
        assert_eq!(
            request.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap(),
            id.to_string()
        );
    }

    #[test]
    fn request_ids_are_unique() {
        let client = build_client(&HttpClientConfig::default()).unwrap();
        let (_, first) = with_request_id(client.post("http://localhost"));
        let (_, second) = with_request_id(client.post("http://localhost"));
        assert_ne!(first, second);
    }
}
