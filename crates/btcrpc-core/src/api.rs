//! Typed daemon API.
//!
//! Thin wrappers over [`DaemonClient::invoke_as`]. Arguments are normalised
//! before they reach the wire: a missing account is `""`, confirmation counts
//! below one become one, and negative indices and fees become zero.

use crate::client::DaemonClient;
use crate::config::DaemonDefaults;
use crate::error::Result;
use crate::models::{
    decode, Account, AddressInfo, Block, DaemonStatus, MiningInfo, Peer, ReceivedByAddress,
    TxOutSetInfo,
};
use crate::rpc::{Params, RpcMethod};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Default page size for `listtransactions`.
const DEFAULT_TRANSACTION_COUNT: i64 = 10;

fn min_confirms(value: i64) -> i64 {
    value.max(1)
}

/// Params for an optional leading string argument: omitted when empty.
fn optional_arg(value: Option<&str>) -> Params {
    match value {
        Some(v) if !v.is_empty() => Params::positional([v]),
        _ => Params::None,
    }
}

impl DaemonClient {
    /// Daemon versions this client was written against.
    pub fn supported_versions(&self) -> &'static [&'static str] {
        DaemonDefaults::SUPPORTED_VERSIONS
    }

    pub async fn backup_wallet(&self, destination: Option<&Path>) -> Result<()> {
        let destination = destination.unwrap_or_else(|| Path::new("."));
        let params = Params::positional([destination.display().to_string()]);
        self.invoke(RpcMethod::BackupWallet, params).await?;
        Ok(())
    }

    /// Account an address belongs to.
    pub async fn get_account(&self, address: &str) -> Result<String> {
        self.invoke_as(RpcMethod::GetAccount, Params::positional([address]))
            .await
    }

    /// Current receiving address of `account`.
    pub async fn get_account_address(&self, account: Option<&str>) -> Result<String> {
        let params = Params::positional([account.unwrap_or_default()]);
        self.invoke_as(RpcMethod::GetAccountAddress, params).await
    }

    pub async fn get_addresses_by_account(&self, account: Option<&str>) -> Result<Vec<String>> {
        let params = Params::positional([account.unwrap_or_default()]);
        self.invoke_as(RpcMethod::GetAddressesByAccount, params)
            .await
    }

    /// Balance of `account` (the default account when `None`).
    pub async fn get_balance(&self, account: Option<&str>, minimum_confirms: i64) -> Result<f64> {
        let params = Params::Positional(vec![
            json!(account.unwrap_or_default()),
            json!(min_confirms(minimum_confirms)),
        ]);
        self.invoke_as(RpcMethod::GetBalance, params).await
    }

    pub async fn get_block(&self, hash: &str) -> Result<Block> {
        self.invoke_as(RpcMethod::GetBlock, Params::positional([hash]))
            .await
    }

    pub async fn get_block_count(&self) -> Result<i64> {
        self.invoke_as(RpcMethod::GetBlockCount, Params::None).await
    }

    /// Hash of the block at `index`; negative indices read as the genesis block.
    pub async fn get_block_hash(&self, index: i64) -> Result<String> {
        let params = Params::positional([index.max(0)]);
        self.invoke_as(RpcMethod::GetBlockHash, params).await
    }

    pub async fn get_connection_count(&self) -> Result<i64> {
        self.invoke_as(RpcMethod::GetConnectionCount, Params::None)
            .await
    }

    pub async fn get_difficulty(&self) -> Result<f64> {
        self.invoke_as(RpcMethod::GetDifficulty, Params::None).await
    }

    pub async fn get_generate(&self) -> Result<bool> {
        self.invoke_as(RpcMethod::GetGenerate, Params::None).await
    }

    pub async fn get_hashes_per_sec(&self) -> Result<i64> {
        self.invoke_as(RpcMethod::GetHashesPerSec, Params::None).await
    }

    pub async fn get_info(&self) -> Result<DaemonStatus> {
        self.invoke_as(RpcMethod::GetInfo, Params::None).await
    }

    pub async fn get_mining_info(&self) -> Result<MiningInfo> {
        self.invoke_as(RpcMethod::GetMiningInfo, Params::None).await
    }

    /// A fresh address, filed under `account` when given.
    pub async fn get_new_address(&self, account: Option<&str>) -> Result<String> {
        self.invoke_as(RpcMethod::GetNewAddress, optional_arg(account))
            .await
    }

    pub async fn get_peer_info(&self) -> Result<Vec<Peer>> {
        self.invoke_as(RpcMethod::GetPeerInfo, Params::None).await
    }

    /// Transaction ids in the memory pool.
    pub async fn get_raw_mempool(&self) -> Result<Vec<String>> {
        self.invoke_as(RpcMethod::GetRawMempool, Params::None).await
    }

    pub async fn get_received_by_account(
        &self,
        account: Option<&str>,
        minimum_confirms: i64,
    ) -> Result<f64> {
        let params = Params::Positional(vec![
            json!(account.unwrap_or_default()),
            json!(min_confirms(minimum_confirms)),
        ]);
        self.invoke_as(RpcMethod::GetReceivedByAccount, params).await
    }

    pub async fn get_received_by_address(&self, address: &str, minimum_confirms: i64) -> Result<f64> {
        let params = Params::Positional(vec![json!(address), json!(min_confirms(minimum_confirms))]);
        self.invoke_as(RpcMethod::GetReceivedByAddress, params).await
    }

    /// Wallet transaction details, as the daemon returns them.
    pub async fn get_transaction(&self, txid: &str) -> Result<Value> {
        self.invoke(RpcMethod::GetTransaction, Params::positional([txid]))
            .await
    }

    pub async fn get_txout_set_info(&self) -> Result<TxOutSetInfo> {
        self.invoke_as(RpcMethod::GetTxOutSetInfo, Params::None).await
    }

    /// General help, or help for one `command`.
    pub async fn help(&self, command: Option<&str>) -> Result<String> {
        self.invoke_as(RpcMethod::Help, optional_arg(command)).await
    }

    pub async fn key_pool_refill(&self) -> Result<()> {
        self.invoke(RpcMethod::KeyPoolRefill, Params::None).await?;
        Ok(())
    }

    /// Balances by account name.
    pub async fn list_accounts(&self, minimum_confirms: i64) -> Result<Vec<Account>> {
        let params = Params::positional([min_confirms(minimum_confirms)]);
        let value = self.invoke(RpcMethod::ListAccounts, params).await?;
        let balances: BTreeMap<String, f64> = decode(RpcMethod::ListAccounts.as_str(), value)?;
        Ok(balances
            .into_iter()
            .map(|(name, amount)| Account {
                name,
                amount,
                confirmations: 0,
            })
            .collect())
    }

    pub async fn list_address_groupings(&self) -> Result<Vec<Value>> {
        self.invoke_as(RpcMethod::ListAddressGroupings, Params::None)
            .await
    }

    pub async fn list_lock_unspent(&self) -> Result<Vec<Value>> {
        self.invoke_as(RpcMethod::ListLockUnspent, Params::None)
            .await
    }

    /// Negative `minimum_confirms` reads as one; zero includes unconfirmed.
    pub async fn list_received_by_account(
        &self,
        minimum_confirms: i64,
        include_empty: bool,
    ) -> Result<Vec<Account>> {
        let minimum_confirms = if minimum_confirms < 0 { 1 } else { minimum_confirms };
        let params = Params::Positional(vec![json!(minimum_confirms), json!(include_empty)]);
        self.invoke_as(RpcMethod::ListReceivedByAccount, params)
            .await
    }

    /// Negative `minimum_confirms` reads as one; zero includes unconfirmed.
    pub async fn list_received_by_address(
        &self,
        minimum_confirms: i64,
        include_empty: bool,
    ) -> Result<Vec<ReceivedByAddress>> {
        let minimum_confirms = if minimum_confirms < 0 { 1 } else { minimum_confirms };
        let params = Params::Positional(vec![json!(minimum_confirms), json!(include_empty)]);
        self.invoke_as(RpcMethod::ListReceivedByAddress, params)
            .await
    }

    /// Wallet transactions since `block_hash`, or all of them when `None`.
    pub async fn list_since_block(
        &self,
        block_hash: Option<&str>,
        target_confirms: i64,
    ) -> Result<Value> {
        let params = match block_hash {
            Some(hash) if !hash.is_empty() => {
                Params::Positional(vec![json!(hash), json!(min_confirms(target_confirms))])
            }
            _ => Params::None,
        };
        self.invoke(RpcMethod::ListSinceBlock, params).await
    }

    /// Up to `count` transactions of `account`, skipping the first `from`.
    ///
    /// `count` below one reads as ten; negative `from` reads as zero.
    pub async fn list_transactions(
        &self,
        account: Option<&str>,
        count: i64,
        from: i64,
    ) -> Result<Vec<Value>> {
        let count = if count < 1 { DEFAULT_TRANSACTION_COUNT } else { count };
        let params = Params::Positional(vec![
            json!(account.unwrap_or_default()),
            json!(count),
            json!(from.max(0)),
        ]);
        self.invoke_as(RpcMethod::ListTransactions, params).await
    }

    pub async fn set_account(&self, address: &str, account: Option<&str>) -> Result<()> {
        let params = Params::positional([address, account.unwrap_or_default()]);
        self.invoke(RpcMethod::SetAccount, params).await?;
        Ok(())
    }

    /// Turn mining on or off. A `processor_limit` below one means unlimited.
    pub async fn set_generate(&self, generate: bool, processor_limit: i64) -> Result<()> {
        let limit = if processor_limit < 1 { -1 } else { processor_limit };
        let params = Params::Positional(vec![json!(generate), json!(limit)]);
        self.invoke(RpcMethod::SetGenerate, params).await?;
        Ok(())
    }

    /// Set the per-kB transaction fee; negative amounts read as zero.
    pub async fn set_tx_fee(&self, amount: f64) -> Result<bool> {
        let params = Params::positional([amount.max(0.0)]);
        self.invoke_as(RpcMethod::SetTxFee, params).await
    }

    pub async fn validate_address(&self, address: &str) -> Result<AddressInfo> {
        self.invoke_as(RpcMethod::ValidateAddress, Params::positional([address]))
            .await
    }
}
