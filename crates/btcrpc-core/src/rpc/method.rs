//! Catalogue of daemon methods known to the client.
//!
//! The set is closed: every method of the daemon's wallet/node API has a
//! variant, and [`RpcMethod::is_supported`] says whether the client wires it
//! to a remote call. Unsupported methods fail with
//! [`BtcRpcError::Unsupported`](crate::BtcRpcError::Unsupported) before any
//! network traffic.

use std::fmt;
use std::str::FromStr;

macro_rules! rpc_methods {
    ($($variant:ident => $wire:literal, $supported:literal;)+) => {
        /// A daemon RPC method.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum RpcMethod {
            $($variant,)+
        }

        impl RpcMethod {
            #[cfg(test)]
            pub(crate) const ALL: &'static [RpcMethod] = &[$(RpcMethod::$variant,)+];

            /// Method name on the wire.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(RpcMethod::$variant => $wire,)+
                }
            }

            /// Whether this client issues the method to the daemon.
            pub fn is_supported(&self) -> bool {
                match self {
                    $(RpcMethod::$variant => $supported,)+
                }
            }

            /// Look up a method by its wire name (case-insensitive).
            pub fn from_wire_name(name: &str) -> Option<Self> {
                match name.to_ascii_lowercase().as_str() {
                    $($wire => Some(RpcMethod::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

rpc_methods! {
    AddMultiSigAddress => "addmultisigaddress", false;
    AddNode => "addnode", false;
    BackupWallet => "backupwallet", true;
    CreateMultiSig => "createmultisig", false;
    CreateRawTransaction => "createrawtransaction", false;
    DecodeRawTransaction => "decoderawtransaction", false;
    DumpPrivKey => "dumpprivkey", false;
    EncryptWallet => "encryptwallet", false;
    GetAccount => "getaccount", true;
    GetAccountAddress => "getaccountaddress", true;
    GetAddedNodeInfo => "getaddednodeinfo", false;
    GetAddressesByAccount => "getaddressesbyaccount", true;
    GetBalance => "getbalance", true;
    GetBlock => "getblock", true;
    GetBlockCount => "getblockcount", true;
    GetBlockHash => "getblockhash", true;
    GetBlockTemplate => "getblocktemplate", false;
    GetConnectionCount => "getconnectioncount", true;
    GetDifficulty => "getdifficulty", true;
    GetGenerate => "getgenerate", true;
    GetHashesPerSec => "gethashespersec", true;
    GetInfo => "getinfo", true;
    GetMiningInfo => "getmininginfo", true;
    GetNewAddress => "getnewaddress", true;
    GetPeerInfo => "getpeerinfo", true;
    GetRawMempool => "getrawmempool", true;
    GetRawTransaction => "getrawtransaction", false;
    GetReceivedByAccount => "getreceivedbyaccount", true;
    GetReceivedByAddress => "getreceivedbyaddress", true;
    GetTransaction => "gettransaction", true;
    GetTxOut => "gettxout", false;
    GetTxOutSetInfo => "gettxoutsetinfo", true;
    GetWork => "getwork", false;
    Help => "help", true;
    ImportPrivKey => "importprivkey", false;
    KeyPoolRefill => "keypoolrefill", true;
    ListAccounts => "listaccounts", true;
    ListAddressGroupings => "listaddressgroupings", true;
    ListLockUnspent => "listlockunspent", true;
    ListReceivedByAccount => "listreceivedbyaccount", true;
    ListReceivedByAddress => "listreceivedbyaddress", true;
    ListSinceBlock => "listsinceblock", true;
    ListTransactions => "listtransactions", true;
    ListUnspent => "listunspent", false;
    LockUnspent => "lockunspent", false;
    Move => "move", false;
    SendFrom => "sendfrom", false;
    SendMany => "sendmany", false;
    SendRawTransaction => "sendrawtransaction", false;
    SendToAddress => "sendtoaddress", false;
    SetAccount => "setaccount", true;
    SetGenerate => "setgenerate", true;
    SetTxFee => "settxfee", true;
    SignMessage => "signmessage", false;
    SignRawTransaction => "signrawtransaction", false;
    Stop => "stop", true;
    SubmitBlock => "submitblock", false;
    ValidateAddress => "validateaddress", true;
    VerifyMessage => "verifymessage", false;
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for [`RpcMethod::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown RPC method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for RpcMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RpcMethod::from_wire_name(s).ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_wire_name_roundtrip() {
        for method in RpcMethod::ALL {
            let parsed = RpcMethod::from_wire_name(method.as_str()).expect("Should parse");
            assert_eq!(*method, parsed);
        }
    }

    #[test]
    fn test_wire_names_unique() {
        let names: HashSet<_> = RpcMethod::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), RpcMethod::ALL.len());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!("GetInfo".parse::<RpcMethod>(), Ok(RpcMethod::GetInfo));
        assert_eq!(
            "nosuchmethod".parse::<RpcMethod>(),
            Err(UnknownMethod("nosuchmethod".to_string()))
        );
    }

    #[test]
    fn test_support_table() {
        assert!(RpcMethod::GetInfo.is_supported());
        assert!(RpcMethod::Stop.is_supported());
        assert!(!RpcMethod::SendToAddress.is_supported());
        assert!(!RpcMethod::SignRawTransaction.is_supported());
        assert_eq!(RpcMethod::ALL.iter().filter(|m| !m.is_supported()).count(), 24);
    }
}
