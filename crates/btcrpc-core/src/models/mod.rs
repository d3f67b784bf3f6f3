//! Typed views of daemon results.
//!
//! Each model decodes from the daemon's JSON with per-field defaults, so a
//! missing field reads as zero/empty rather than failing the call. A value of
//! the wrong JSON type fails through [`decode`] with
//! [`ProtocolError::UnexpectedShape`].

mod block;
mod peer;
mod status;
mod wallet;

pub use block::*;
pub use peer::*;
pub use status::*;
pub use wallet::*;

use crate::error::ProtocolError;
use crate::rpc::envelope::json_kind;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a result value into `T`, naming `method` on failure.
pub fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, ProtocolError> {
    let kind = json_kind(&value);
    serde_json::from_value(value).map_err(|e| ProtocolError::UnexpectedShape {
        method: method.to_string(),
        detail: format!("{} (got {})", e, kind),
    })
}
