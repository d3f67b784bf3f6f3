//! Peer type (`getpeerinfo`).

use serde::{Deserialize, Serialize};

/// One entry of `getpeerinfo`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Peer {
    #[serde(rename = "addr")]
    pub network_address: String,
    pub services: String,
    #[serde(rename = "lastsend")]
    pub last_send: i64,
    #[serde(rename = "lastrecv")]
    pub last_received: i64,
    #[serde(rename = "bytessent")]
    pub bytes_sent: i64,
    #[serde(rename = "bytesrecv")]
    pub bytes_received: i64,
    #[serde(rename = "conntime")]
    pub connection_time: i64,
    pub version: i64,
    #[serde(rename = "subver")]
    pub sub_version: String,
    pub inbound: bool,
    #[serde(rename = "startingheight")]
    pub starting_height: i64,
    #[serde(rename = "banscore")]
    pub ban_score: i64,
    #[serde(rename = "syncnode")]
    pub sync_node: bool,
}
