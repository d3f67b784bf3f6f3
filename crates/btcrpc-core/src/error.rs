//! Error types for the bitcoind RPC client.
//!
//! Failures are split by the layer that produced them so callers can branch on
//! transport vs. protocol vs. application failure without string matching.

use crate::rpc::RpcMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the client.
#[derive(Debug, Error)]
pub enum BtcRpcError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Recognised method that this client does not wire to the daemon.
    #[error("Method not supported by this client: {0}")]
    Unsupported(RpcMethod),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, BtcRpcError>;

/// Network/HTTP-layer failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The daemon answered with a status other than 200.
    #[error("HTTP {code} {reason}")]
    HttpStatus { code: u16, reason: String },

    /// Socket-level failure: refused, reset, name resolution, timeout.
    #[error("I/O error: {0}")]
    Io(String),
}

/// The response violated the envelope contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// No correlation id in the response. A server error object found in the
    /// same envelope is kept as the cause.
    #[error(
        "Response is missing its id{}",
        .cause.as_ref().map(|c| format!(" ({})", c)).unwrap_or_default()
    )]
    MissingId {
        #[source]
        cause: Option<RpcError>,
    },

    #[error("Response id {actual:?} does not match request id {expected:?}")]
    IdMismatch { expected: String, actual: String },

    #[error("Unexpected result shape for {method}: {detail}")]
    UnexpectedShape { method: String, detail: String },

    #[error("Failed to encode request: {0}")]
    Encode(String),
}

/// Application error reported by the daemon, carried verbatim.
///
/// This is also the wire shape of the JSON-RPC `error` member.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("RPC error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// JSON-RPC: method not found.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// JSON-RPC: invalid params.
    pub const INVALID_PARAMS: i64 = -32602;
    /// bitcoind: generic application error.
    pub const MISC_ERROR: i64 = -1;
    /// bitcoind: still loading the block index or wallet.
    pub const IN_WARMUP: i64 = -28;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// The daemon is up but not yet serving requests.
    pub fn is_warming_up(&self) -> bool {
        self.code == Self::IN_WARMUP
    }
}

/// Bootstrap failures.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Invalid daemon endpoint {endpoint}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("Failed to launch daemon {}: {source}", binary.display())]
    LaunchFailed {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every probe failed; `last_error` is the final attempt's failure.
    #[error("Daemon unreachable after {attempts} attempt(s): {last_error}")]
    Unreachable {
        attempts: u32,
        last_error: Box<BtcRpcError>,
    },

    #[error("Connection cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

impl BtcRpcError {
    /// Server error code, when the daemon reported one.
    ///
    /// Includes error objects attached to a `MissingId` protocol failure.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            BtcRpcError::Rpc(err) => Some(err.code),
            BtcRpcError::Protocol(ProtocolError::MissingId { cause: Some(err) }) => Some(err.code),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, BtcRpcError::Transport(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, BtcRpcError::Protocol(_))
    }
}
