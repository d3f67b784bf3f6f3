//! Response correlation and result/error dispatch.

use super::envelope::ResponseEnvelope;
use crate::error::{ProtocolError, Result};
use serde_json::Value;

/// Match a response to the request id and split result from error.
///
/// Order matters: a response without an id surfaces the server's error
/// object (if any) before an id comparison is attempted.
pub fn dispatch(request_id: &str, envelope: ResponseEnvelope) -> Result<Value> {
    let ResponseEnvelope { id, result, error } = envelope;

    let id = match id {
        Some(id) => id,
        None => return Err(ProtocolError::MissingId { cause: error }.into()),
    };

    if let Some(error) = error {
        return Err(error.into());
    }

    if id != request_id {
        return Err(ProtocolError::IdMismatch {
            expected: request_id.to_string(),
            actual: id,
        }
        .into());
    }

    Ok(result.unwrap_or(Value::Null))
}
