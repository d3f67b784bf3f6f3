//! JSON-RPC over HTTP.
//!
//! # Architecture
//!
//! - **Envelope**: request/response wire types and their codec
//! - **Transport**: one HTTP POST per call with Basic authentication
//! - **Dispatch**: correlates the response id and splits result from error
//! - **Channel**: the pipeline tying the three together
//! - **Method**: the closed catalogue of daemon methods

pub mod channel;
pub mod dispatch;
pub mod envelope;
pub mod method;
pub mod transport;

pub use channel::RpcChannel;
pub use dispatch::dispatch;
pub use envelope::{decode_response, encode_request, Params, RequestEnvelope, ResponseEnvelope};
pub use method::{RpcMethod, UnknownMethod};
pub use transport::{HttpTransport, Transport};
