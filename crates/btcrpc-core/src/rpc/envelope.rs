//! JSON-RPC envelope codec.
//!
//! Request format:
//! ```json
//! {"jsonrpc": "1.0", "method": "getblock", "params": ["<hash>"], "id": "<uuid>"}
//! ```
//!
//! `params` is always present on the wire; it is `null` when the call has no
//! parameters.

use crate::config::RpcConfig;
use crate::error::{ProtocolError, RpcError};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Call parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    /// Serialized as `null`.
    #[default]
    None,
    Positional(Vec<Value>),
    Named(Map<String, Value>),
}

impl Params {
    /// Positional parameters from anything convertible to JSON values.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Params::None)
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Params::Named(map)
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Params::None => serializer.serialize_none(),
            Params::Positional(values) => values.serialize(serializer),
            Params::Named(map) => map.serialize(serializer),
        }
    }
}

/// Outgoing request envelope.
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a> {
    pub jsonrpc: &'a str,
    pub method: &'a str,
    pub params: &'a Params,
    pub id: &'a str,
}

/// Incoming response envelope.
///
/// `error: null`, as bitcoind sends on success, decodes to `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseEnvelope {
    pub id: Option<String>,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

/// Fresh correlation id: a random UUID rendered as text.
pub fn new_correlation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Encode a request envelope to wire bytes.
pub fn encode_request(method: &str, params: &Params, id: &str) -> Result<Vec<u8>, ProtocolError> {
    let envelope = RequestEnvelope {
        jsonrpc: RpcConfig::JSONRPC_VERSION,
        method,
        params,
        id,
    };
    serde_json::to_vec(&envelope).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decode a response envelope from wire bytes.
///
/// Fails with [`ProtocolError::Malformed`] unless the body is a single JSON
/// object. A non-string `id` is kept in its JSON text form so it can never
/// match a request id.
pub fn decode_response(bytes: &[u8]) -> Result<ResponseEnvelope, ProtocolError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ProtocolError::Malformed(format!("invalid JSON: {}", e)))?;

    let mut object = match value {
        Value::Object(object) => object,
        other => {
            return Err(ProtocolError::Malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    let id = match object.remove("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id),
        Some(other) => Some(other.to_string()),
    };

    let error = match object.remove("error") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(
            serde_json::from_value::<RpcError>(raw)
                .map_err(|e| ProtocolError::Malformed(format!("invalid error object: {}", e)))?,
        ),
    };

    Ok(ResponseEnvelope {
        id,
        result: object.remove("result"),
        error,
    })
}

/// Short name of a JSON value's type, for diagnostics.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode_to_value(method: &str, params: &Params, id: &str) -> Value {
        serde_json::from_slice(&encode_request(method, params, id).unwrap()).unwrap()
    }

    #[test]
    fn test_request_without_params_has_explicit_null() {
        let request = encode_to_value("getinfo", &Params::None, "abc");
        assert_eq!(
            request,
            json!({"jsonrpc": "1.0", "method": "getinfo", "params": null, "id": "abc"})
        );
        assert!(request.as_object().unwrap().contains_key("params"));
    }

    #[test]
    fn test_request_with_positional_params() {
        let params = Params::positional([json!("user"), json!(1)]);
        let request = encode_to_value("getbalance", &params, "id-1");
        assert_eq!(request["params"], json!(["user", 1]));
        assert_eq!(request["method"], "getbalance");
    }

    #[test]
    fn test_request_with_named_params() {
        let mut map = Map::new();
        map.insert("verbose".into(), json!(true));
        let request = encode_to_value("getblock", &Params::from(map), "id-2");
        assert_eq!(request["params"], json!({"verbose": true}));
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = new_correlation_id();
        let b = new_correlation_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_decode_success_with_null_error() {
        let envelope =
            decode_response(br#"{"result": 42, "error": null, "id": "abc"}"#).unwrap();
        assert_eq!(envelope.id.as_deref(), Some("abc"));
        assert_eq!(envelope.result, Some(json!(42)));
        assert_eq!(envelope.error, None);
    }

    #[test]
    fn test_decode_error_object() {
        let envelope = decode_response(
            br#"{"id":"abc","error":{"code":-32601,"message":"Method not found"}}"#,
        )
        .unwrap();
        assert_eq!(
            envelope.error,
            Some(RpcError::new(-32601, "Method not found"))
        );
        assert_eq!(envelope.result, None);
    }

    #[test]
    fn test_decode_missing_and_null_id() {
        assert_eq!(decode_response(br#"{"result":1}"#).unwrap().id, None);
        assert_eq!(decode_response(br#"{"result":1,"id":null}"#).unwrap().id, None);
    }

    #[test]
    fn test_decode_numeric_id_kept_as_text() {
        let envelope = decode_response(br#"{"result":1,"id":7}"#).unwrap();
        assert_eq!(envelope.id.as_deref(), Some("7"));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let err = decode_response(b"<html>nope</html>").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = decode_response(b"[1,2,3]").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Malformed("expected a JSON object, got array".to_string())
        );
    }

    #[test]
    fn test_decode_rejects_bad_error_object() {
        let err = decode_response(br#"{"id":"a","error":"oops"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }
}
