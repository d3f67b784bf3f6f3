//! The request pipeline: encode, send, decode, dispatch.
//!
//! Each call builds its own envelope with a fresh correlation id and uses an
//! independent transport exchange, so concurrent calls share no mutable state.

use super::dispatch::dispatch;
use super::envelope::{decode_response, encode_request, new_correlation_id, Params};
use super::transport::Transport;
use crate::error::Result;
use crate::models::decode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// A handle on the JSON-RPC pipeline over some transport.
#[derive(Clone)]
pub struct RpcChannel {
    transport: Arc<dyn Transport>,
}

impl RpcChannel {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Issue one call and return the raw result value.
    pub async fn call(&self, method: &str, params: Params) -> Result<Value> {
        let id = new_correlation_id();
        let body = encode_request(method, &params, &id)?;
        debug!("request: {}", String::from_utf8_lossy(&body));

        let raw = self.transport.send(body).await?;
        debug!("response: {}", String::from_utf8_lossy(&raw));

        let envelope = decode_response(&raw)?;
        dispatch(&id, envelope)
    }

    /// Issue one call and decode the result into `T`.
    pub async fn call_as<T: DeserializeOwned>(&self, method: &str, params: Params) -> Result<T> {
        let value = self.call(method, params).await?;
        Ok(decode(method, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BtcRpcError, ProtocolError, TransportError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Echoes the request id back with a fixed result.
    struct EchoTransport {
        result: Value,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, body: Vec<u8>) -> std::result::Result<Vec<u8>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let request: Value = serde_json::from_slice(&body).unwrap();
            Ok(json!({"id": request["id"], "result": self.result, "error": null})
                .to_string()
                .into_bytes())
        }
    }

    struct FixedTransport(std::result::Result<&'static str, TransportError>);

    #[async_trait]
    impl Transport for FixedTransport {
        async fn send(&self, _body: Vec<u8>) -> std::result::Result<Vec<u8>, TransportError> {
            self.0.clone().map(|s| s.as_bytes().to_vec())
        }
    }

    fn channel(transport: impl Transport + 'static) -> RpcChannel {
        RpcChannel::new(Arc::new(transport))
    }

    #[tokio::test]
    async fn test_call_round_trip() {
        let channel = channel(EchoTransport {
            result: json!({"blocks": 12}),
            calls: AtomicU32::new(0),
        });
        let value = channel.call("getinfo", Params::None).await.unwrap();
        assert_eq!(value, json!({"blocks": 12}));
    }

    #[tokio::test]
    async fn test_call_as_decodes() {
        let channel = channel(EchoTransport {
            result: json!(251_000),
            calls: AtomicU32::new(0),
        });
        let count: u64 = channel.call_as("getblockcount", Params::None).await.unwrap();
        assert_eq!(count, 251_000);
    }

    #[tokio::test]
    async fn test_call_as_wrong_shape() {
        let channel = channel(EchoTransport {
            result: json!("not a number"),
            calls: AtomicU32::new(0),
        });
        let err = channel
            .call_as::<u64>("getblockcount", Params::None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BtcRpcError::Protocol(ProtocolError::UnexpectedShape { .. })
        ));
    }

    #[tokio::test]
    async fn test_http_status_fails_before_decoding() {
        let channel = channel(FixedTransport(Err(TransportError::HttpStatus {
            code: 500,
            reason: "Internal Server Error".into(),
        })));
        let err = channel.call("getinfo", Params::None).await.unwrap_err();
        assert!(matches!(
            err,
            BtcRpcError::Transport(TransportError::HttpStatus { code: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_stale_id_is_mismatch() {
        let channel = channel(FixedTransport(Ok(r#"{"id":"stale","result":1}"#)));
        let err = channel.call("getinfo", Params::None).await.unwrap_err();
        assert!(matches!(
            err,
            BtcRpcError::Protocol(ProtocolError::IdMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let channel = channel(FixedTransport(Ok("not json")));
        let err = channel.call("getinfo", Params::None).await.unwrap_err();
        assert!(matches!(err, BtcRpcError::Protocol(ProtocolError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_concurrent_calls_use_distinct_ids() {
        let transport = Arc::new(EchoTransport {
            result: json!(true),
            calls: AtomicU32::new(0),
        });
        let channel = RpcChannel::new(transport.clone());
        let (a, b) = tokio::join!(
            channel.call("getgenerate", Params::None),
            channel.call("getgenerate", Params::None)
        );
        assert_eq!(a.unwrap(), json!(true));
        assert_eq!(b.unwrap(), json!(true));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }
}
