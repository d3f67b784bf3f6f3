//! btcrpc core - JSON-RPC client for bitcoind.
//!
//! Each call is one HTTP POST carrying a JSON-RPC envelope with a fresh
//! correlation id; the response id must match before its result or error is
//! returned. A [`DaemonClient`] is only handed out once the daemon has
//! answered a readiness probe, optionally after launching it.
//!
//! # Example
//!
//! ```rust,no_run
//! use btcrpc_core::{connect_daemon, ConnectionConfig, DaemonDefaults};
//!
//! #[tokio::main]
//! async fn main() -> btcrpc_core::Result<()> {
//!     let config = ConnectionConfig::from_host(
//!         DaemonDefaults::HOST,
//!         DaemonDefaults::TESTNET_PORT,
//!         "user",
//!         "password",
//!     )?;
//!     let client = connect_daemon(config).await?;
//!
//!     let height = client.get_block_count().await?;
//!     let hash = client.get_block_hash(height).await?;
//!     let block = client.get_block(&hash).await?;
//!     println!("block {} has {} transactions", block.height, block.tx.len());
//!
//!     Ok(())
//! }
//! ```

pub mod backoff;
pub mod cancel;
pub mod config;
pub mod error;
pub mod models;
pub mod process;
pub mod rpc;

mod api;
mod client;
mod establish;

pub use backoff::{BackoffSchedule, RetryStats};
pub use cancel::{CancellationToken, CancelledError};
pub use client::DaemonClient;
pub use config::{ConnectionConfig, DaemonDefaults, RpcConfig};
pub use error::{BtcRpcError, ConnectionError, ProtocolError, Result, RpcError, TransportError};
pub use establish::{connect_daemon, run_daemon, Establisher};
pub use models::{
    Account, AddressInfo, Block, DaemonStatus, MiningInfo, Peer, ReceivedByAddress, TxOutSetInfo,
};
pub use process::{DaemonLauncher, DaemonProcess, LaunchConfig, ManagedProcess};
pub use rpc::{Params, RpcMethod};
