//! btcrpc - command-line JSON-RPC client for bitcoind.
//!
//! Connects to (or launches) a daemon, invokes one method and prints the
//! result as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use btcrpc_core::{
    CancellationToken, ConnectionConfig, DaemonDefaults, DaemonLauncher, Establisher,
    LaunchConfig, Params,
};
use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "btcrpc")]
#[command(about = "JSON-RPC client for bitcoind")]
struct Args {
    /// Daemon host
    #[arg(long, env = "BTCRPC_HOST", default_value = DaemonDefaults::HOST)]
    host: String,

    /// Daemon RPC port (defaults to 8332, or 18332 with --testnet)
    #[arg(short, long, env = "BTCRPC_PORT")]
    port: Option<u16>,

    /// RPC user
    #[arg(short, long, env = "BTCRPC_USER")]
    user: String,

    /// RPC password
    #[arg(long, env = "BTCRPC_PASSWORD", hide_env_values = true)]
    password: String,

    /// Connection timeout in milliseconds
    #[arg(long, env = "BTCRPC_TIMEOUT_MS", default_value = "1000")]
    timeout_ms: u64,

    /// Connection attempts before giving up
    #[arg(long, env = "BTCRPC_ATTEMPTS", default_value_t = DaemonDefaults::CONNECT_ATTEMPTS)]
    attempts: u32,

    /// Backoff step in milliseconds (defaults to the timeout)
    #[arg(long, env = "BTCRPC_BACKOFF_MS")]
    backoff_ms: Option<u64>,

    /// Use the testnet port and launch flags
    #[arg(long)]
    testnet: bool,

    /// Launch this bitcoind binary and stop it when done
    #[arg(long, value_name = "BITCOIND")]
    spawn: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Method to invoke, e.g. getinfo
    method: String,

    /// Positional parameters; parsed as JSON, falling back to strings
    params: Vec<String>,
}

impl Args {
    fn connection_config(&self) -> Result<ConnectionConfig> {
        let host = if self.spawn.is_some() {
            DaemonDefaults::HOST
        } else {
            self.host.as_str()
        };
        let port = self
            .port
            .unwrap_or_else(|| DaemonDefaults::port(self.testnet));

        let mut config =
            ConnectionConfig::from_host(host, port, self.user.clone(), self.password.clone())?
                .with_timeout(Duration::from_millis(self.timeout_ms))
                .with_max_attempts(self.attempts);
        if let Some(step) = self.backoff_ms {
            config = config.with_backoff_step(Duration::from_millis(step));
        }
        Ok(config)
    }
}

/// Turn command-line words into positional parameters.
fn parse_params(words: &[String]) -> Params {
    if words.is_empty() {
        return Params::None;
    }
    Params::Positional(
        words
            .iter()
            .map(|word| serde_json::from_str(word).unwrap_or_else(|_| Value::String(word.clone())))
            .collect(),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let config = args.connection_config()?;
    let token = CancellationToken::new();
    let mut establisher = Establisher::new(config).with_cancellation(token.clone());

    if let Some(ref binary) = args.spawn {
        let launch = LaunchConfig::new(binary, args.user.clone(), args.password.clone())
            .with_testnet(args.testnet);
        let process = DaemonLauncher::launch(&launch)?;
        establisher = establisher.with_process(Box::new(process));
    }

    let canceller = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            canceller.cancel();
        }
    });

    let client = establisher.establish().await?;

    let params = parse_params(&args.params);
    debug!("Invoking {} with {:?}", args.method, params);
    let result = client
        .call(&args.method, params)
        .await
        .with_context(|| format!("{} failed", args.method))?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if client.owns_process() {
        client.stop().await?;
    }
    Ok(())
}
