//! Wallet types: addresses and accounts.

use serde::{Deserialize, Serialize};

/// Result of `validateaddress`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressInfo {
    #[serde(rename = "isvalid")]
    pub valid: bool,
    pub address: String,
    #[serde(rename = "ismine")]
    pub mine: bool,
    #[serde(rename = "isscript")]
    pub script: bool,
    #[serde(rename = "pubkey")]
    pub public_key: String,
    #[serde(rename = "iscompressed")]
    pub compressed: bool,
    pub account: String,
}

/// One entry of `listreceivedbyaddress`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceivedByAddress {
    pub address: String,
    pub account: String,
    pub amount: f64,
    pub confirmations: i64,
}

/// An account balance, from `listaccounts` or `listreceivedbyaccount`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    #[serde(rename = "account")]
    pub name: String,
    pub amount: f64,
    pub confirmations: i64,
}
