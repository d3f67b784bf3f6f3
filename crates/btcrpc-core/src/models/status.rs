//! Node status types (`getinfo`, `getmininginfo`).

use serde::{Deserialize, Serialize};

/// Result of `getinfo`; also the establishment probe.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonStatus {
    pub version: i64,
    #[serde(rename = "protocolversion")]
    pub protocol_version: i64,
    #[serde(rename = "walletversion")]
    pub wallet_version: i64,
    pub balance: f64,
    pub blocks: i64,
    #[serde(rename = "timeoffset")]
    pub time_offset: i64,
    pub connections: i64,
    pub proxy: String,
    pub difficulty: f64,
    pub testnet: bool,
    #[serde(rename = "keypoololdest")]
    pub key_pool_oldest: i64,
    #[serde(rename = "keypoolsize")]
    pub key_pool_size: i64,
    #[serde(rename = "paytxfee")]
    pub pay_tx_fee: f64,
    pub errors: String,
}

/// Result of `getmininginfo`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningInfo {
    pub blocks: i64,
    #[serde(rename = "currentblocksize")]
    pub current_block_size: i64,
    #[serde(rename = "currentblocktx")]
    pub current_block_tx: i64,
    pub difficulty: f64,
    pub errors: String,
    pub generate: bool,
    #[serde(rename = "genproclimit")]
    pub gen_proc_limit: i64,
    #[serde(rename = "hashespersec")]
    pub hashes_per_sec: i64,
    #[serde(rename = "pooledtx")]
    pub pooled_tx: i64,
    pub testnet: bool,
}
