//! Chain types (`getblock`, `gettxoutsetinfo`).

use serde::{Deserialize, Serialize};

/// Result of `getblock`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    pub hash: String,
    pub confirmations: i64,
    pub size: i64,
    pub height: i64,
    pub version: i64,
    #[serde(rename = "merkleroot")]
    pub merkle_root: String,
    /// Transaction ids in block order.
    pub tx: Vec<String>,
    pub time: i64,
    pub nonce: i64,
    pub bits: String,
    pub difficulty: f64,
    #[serde(rename = "previousblockhash")]
    pub previous_block_hash: Option<String>,
    #[serde(rename = "nextblockhash")]
    pub next_block_hash: Option<String>,
}

/// Result of `gettxoutsetinfo`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TxOutSetInfo {
    pub height: i64,
    #[serde(rename = "bestblock")]
    pub best_block: String,
    pub transactions: i64,
    #[serde(rename = "txouts")]
    pub tx_outs: i64,
    #[serde(rename = "bytes_serialized")]
    pub bytes_serialized: i64,
    #[serde(rename = "hash_serialized")]
    pub hash_serialized: String,
    #[serde(rename = "total_amount")]
    pub total_amount: f64,
}
