//! HTTP transport for JSON-RPC calls.
//!
//! One POST per call, JSON content type, HTTP Basic credentials. The
//! configured timeout bounds connection acquisition only; reading the
//! response body is not time-limited.

use crate::config::{ConnectionConfig, RpcConfig};
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::{header, redirect, Client, StatusCode};
use std::error::Error as _;
use tracing::debug;
use url::Url;

/// Sends one encoded request and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}

/// reqwest-backed transport bound to a single endpoint.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    account: String,
    secret: String,
}

impl HttpTransport {
    pub fn new(config: &ConnectionConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            // Credentials must not follow a redirect off the configured host/port.
            .redirect(redirect::Policy::none())
            // No idle pooling: the connection is released when the call ends.
            .pool_max_idle_per_host(0)
            .user_agent(RpcConfig::USER_AGENT)
            .build()
            .map_err(|e| TransportError::Io(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint().clone(),
            account: config.account().to_string(),
            secret: config.secret().to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, RpcConfig::CONTENT_TYPE)
            .basic_auth(&self.account, Some(&self.secret))
            .body(body)
            .send()
            .await
            .map_err(|e| io_error(&self.endpoint, &e))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!("POST {} returned {}", self.endpoint, status);
            return Err(TransportError::HttpStatus {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| io_error(&self.endpoint, &e))?;
        Ok(bytes.to_vec())
    }
}

/// Flatten a reqwest error and its causes into one message.
fn io_error(endpoint: &Url, err: &reqwest::Error) -> TransportError {
    let mut message = format!("POST {} failed: {}", endpoint, err);
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    TransportError::Io(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_transport_binds_config_endpoint() {
        let config = ConnectionConfig::from_host("127.0.0.1", 18332, "user", "pw")
            .unwrap()
            .with_timeout(Duration::from_millis(50));
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.endpoint().as_str(), "http://127.0.0.1:18332/");
    }

    #[tokio::test]
    async fn test_refused_connection_is_io_error() {
        // Nothing listens on port 1.
        let config = ConnectionConfig::from_host("127.0.0.1", 1, "user", "pw")
            .unwrap()
            .with_timeout(Duration::from_millis(200));
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport.send(b"{}".to_vec()).await.unwrap_err();
        match err {
            TransportError::Io(message) => assert!(message.contains("127.0.0.1:1")),
            other => panic!("Expected Io, got: {:?}", other),
        }
    }
}
