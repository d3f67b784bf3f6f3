//! Connection bootstrap.
//!
//! The establisher probes the daemon with linear backoff until it answers,
//! the attempts run out, or the caller cancels. It is the only way to obtain
//! a [`DaemonClient`].
//!
//! ```text
//! Idle ──> Attempting(1) ──> ... ──> Attempting(n) ──> Connected
//!                 │                        │
//!                 └────────────────────────┴─────────> Failed
//! ```

use crate::backoff::{BackoffSchedule, RetryStats};
use crate::cancel::CancellationToken;
use crate::client::DaemonClient;
use crate::config::{ConnectionConfig, DaemonDefaults};
use crate::error::{BtcRpcError, ConnectionError, Result};
use crate::models::DaemonStatus;
use crate::process::{DaemonLauncher, LaunchConfig, ManagedProcess};
use crate::rpc::{HttpTransport, Params, RpcChannel, RpcMethod, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Where an establishment run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EstablishState {
    Idle,
    /// Waiting for, or running, probe `attempt` (1-indexed).
    Attempting { attempt: u32 },
    Connected,
    Failed,
}

impl EstablishState {
    fn is_terminal(&self) -> bool {
        matches!(self, EstablishState::Connected | EstablishState::Failed)
    }
}

/// Probes a daemon until it is ready and hands back a [`DaemonClient`].
pub struct Establisher {
    config: ConnectionConfig,
    transport: Option<Arc<dyn Transport>>,
    process: Option<Box<dyn ManagedProcess>>,
    cancel: CancellationToken,
    probe: RpcMethod,
    state: EstablishState,
    stats: RetryStats,
}

impl Establisher {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            transport: None,
            process: None,
            cancel: CancellationToken::new(),
            probe: RpcMethod::GetInfo,
            state: EstablishState::Idle,
            stats: RetryStats::default(),
        }
    }

    /// Use `transport` instead of HTTP to the configured endpoint.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Hand over a launched daemon.
    ///
    /// It is terminated if establishment fails and owned by the client if it
    /// succeeds.
    pub fn with_process(mut self, process: Box<dyn ManagedProcess>) -> Self {
        self.process = Some(process);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Readiness probe; `getinfo` unless set.
    pub fn with_probe(mut self, method: RpcMethod) -> Self {
        self.probe = method;
        self
    }

    /// Run the bootstrap to completion.
    pub async fn establish(mut self) -> Result<DaemonClient> {
        let transport = match self.transport.take() {
            Some(transport) => transport,
            None => match HttpTransport::new(&self.config) {
                Ok(http) => Arc::new(http),
                Err(e) => {
                    self.fail().await;
                    return Err(e.into());
                }
            },
        };
        let channel = RpcChannel::new(transport);
        let schedule = BackoffSchedule::from_config(&self.config);
        let endpoint = self.config.endpoint().clone();

        let cancel = self.cancel.clone();
        debug!(
            "Probing {} with up to {} attempt(s), {:?} of backoff",
            endpoint,
            schedule.max_attempts,
            schedule.total_delay()
        );

        let mut attempt = 0;
        let last_error = loop {
            attempt += 1;
            let delay = schedule.delay_for(attempt);
            self.enter(EstablishState::Attempting { attempt });
            info!(
                "Attempt {} of {} to ping {}",
                attempt, schedule.max_attempts, endpoint
            );

            if cancel.sleep(delay).await.is_err() {
                return Err(self.cancelled().await);
            }
            self.stats.total_delay += delay;
            self.stats.attempts = attempt;

            let outcome = tokio::select! {
                outcome = channel.call(self.probe.as_str(), Params::None) => Some(outcome),
                _ = cancel.cancelled() => None,
            };
            let Some(outcome) = outcome else {
                return Err(self.cancelled().await);
            };

            match outcome {
                Ok(value) => {
                    let status: DaemonStatus = serde_json::from_value(value).unwrap_or_default();
                    info!(
                        "connected bitcoind {} on {} as {}",
                        status.version,
                        endpoint,
                        self.config.account()
                    );
                    self.stats.success = true;
                    self.enter(EstablishState::Connected);
                    debug!("Establishment stats: {:?}", self.stats);

                    let process = self.process.take();
                    return Ok(DaemonClient::new(
                        channel,
                        self.config.clone(),
                        status,
                        process,
                    ));
                }
                Err(e) => {
                    warn!("Attempt {}/{} failed: {}", attempt, schedule.max_attempts, e);
                    self.stats.last_error = Some(e.to_string());
                    if attempt >= schedule.max_attempts {
                        break e;
                    }
                }
            }
        };

        self.fail().await;
        error!("{}", last_error);
        debug!("Establishment stats: {:?}", self.stats);
        Err(ConnectionError::Unreachable {
            attempts: self.stats.attempts,
            last_error: Box::new(last_error),
        }
        .into())
    }

    #[cfg(test)]
    fn state(&self) -> EstablishState {
        self.state
    }

    fn enter(&mut self, next: EstablishState) {
        if self.state.is_terminal() {
            return;
        }
        debug!("Establisher {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    async fn fail(&mut self) {
        self.enter(EstablishState::Failed);
        if let Some(mut process) = self.process.take() {
            let terminated = tokio::task::spawn_blocking(move || process.terminate()).await;
            if let Err(e) = terminated {
                error!("Failed to terminate daemon process: {}", e);
            }
        }
    }

    async fn cancelled(&mut self) -> BtcRpcError {
        warn!("Establishment cancelled after {} attempt(s)", self.stats.attempts);
        self.fail().await;
        ConnectionError::Cancelled {
            attempts: self.stats.attempts,
        }
        .into()
    }
}

/// Connect to a daemon that is already running.
pub async fn connect_daemon(config: ConnectionConfig) -> Result<DaemonClient> {
    Establisher::new(config).establish().await
}

/// Launch a local daemon and connect to it on `127.0.0.1`.
///
/// The port follows `launch.testnet`. `timeout` is both the connection
/// timeout and the backoff step.
pub async fn run_daemon(
    launch: &LaunchConfig,
    timeout: Duration,
    max_attempts: u32,
) -> Result<DaemonClient> {
    let config = ConnectionConfig::from_host(
        DaemonDefaults::HOST,
        DaemonDefaults::port(launch.testnet),
        launch.account.clone(),
        launch.secret.clone(),
    )?
    .with_timeout(timeout)
    .with_max_attempts(max_attempts);

    let process = DaemonLauncher::launch(launch)?;
    Establisher::new(config)
        .with_process(Box::new(process))
        .establish()
        .await
}
