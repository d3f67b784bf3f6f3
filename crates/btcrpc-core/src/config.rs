//! Connection configuration and defaults.
//!
//! Constants are grouped by concern in unit structs. The per-client
//! [`ConnectionConfig`] is built once and never mutated afterwards.

use crate::error::ConnectionError;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Defaults for reaching a local bitcoind.
pub struct DaemonDefaults;

impl DaemonDefaults {
    pub const HOST: &'static str = "127.0.0.1";
    pub const MAINNET_PORT: u16 = 8332;
    pub const TESTNET_PORT: u16 = 18332;
    pub const CONNECT_ATTEMPTS: u32 = 5;
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
    /// Daemon versions this client has been exercised against.
    pub const SUPPORTED_VERSIONS: &'static [&'static str] = &["0.8.5", "0.8.6"];

    /// RPC port for the selected network.
    pub fn port(testnet: bool) -> u16 {
        if testnet {
            Self::TESTNET_PORT
        } else {
            Self::MAINNET_PORT
        }
    }
}

/// Wire-level constants.
pub struct RpcConfig;

impl RpcConfig {
    pub const JSONRPC_VERSION: &'static str = "1.0";
    pub const CONTENT_TYPE: &'static str = "application/json";
    pub const USER_AGENT: &'static str = concat!("btcrpc/", env!("CARGO_PKG_VERSION"));
    /// Method used to confirm the daemon is live during establishment.
    pub const PROBE_METHOD: &'static str = "getinfo";
    /// Grace period between asking an owned daemon to exit and killing it.
    pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
}

/// Immutable settings for one client.
///
/// Built with consuming `with_*` methods; values below their minimum are
/// clamped rather than rejected.
#[derive(Clone)]
pub struct ConnectionConfig {
    endpoint: Url,
    account: String,
    secret: String,
    timeout: Duration,
    max_attempts: u32,
    backoff_step: Option<Duration>,
}

impl ConnectionConfig {
    /// Smallest accepted connection timeout.
    pub const MIN_TIMEOUT: Duration = Duration::from_millis(1);

    pub fn new(endpoint: Url, account: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            endpoint,
            account: account.into(),
            secret: secret.into(),
            timeout: DaemonDefaults::CONNECT_TIMEOUT,
            max_attempts: DaemonDefaults::CONNECT_ATTEMPTS,
            backoff_step: None,
        }
    }

    /// Build a config for `http://host:port`.
    pub fn from_host(
        host: &str,
        port: u16,
        account: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, ConnectionError> {
        let raw = format!("http://{}:{}", host, port);
        let endpoint = Url::parse(&raw).map_err(|e| ConnectionError::InvalidEndpoint {
            endpoint: raw.clone(),
            message: e.to_string(),
        })?;
        if endpoint.host_str().is_none() {
            return Err(ConnectionError::InvalidEndpoint {
                endpoint: raw,
                message: "missing host".to_string(),
            });
        }
        Ok(Self::new(endpoint, account, secret))
    }

    /// Set the connection-acquisition timeout (clamped to at least 1ms).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(Self::MIN_TIMEOUT);
        self
    }

    /// Set the number of establishment probes (clamped to at least 1).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the linear backoff step used during establishment.
    ///
    /// Defaults to the connection timeout when unset.
    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = Some(step);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff_step(&self) -> Duration {
        self.backoff_step.unwrap_or(self.timeout)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_step", &self.backoff_step())
            .finish()
    }
}
