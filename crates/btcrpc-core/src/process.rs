//! Launching and terminating a local bitcoind.
//!
//! The establisher only ever needs to terminate a process it was handed, so
//! that capability is the [`ManagedProcess`] trait. [`DaemonLauncher`] produces
//! the concrete [`DaemonProcess`].

use crate::config::RpcConfig;
use crate::error::ConnectionError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A process the client may own and must be able to stop.
pub trait ManagedProcess: Send {
    /// OS process id, if the process is still tracked.
    fn id(&self) -> Option<u32>;

    /// Stop the process. Calling this more than once is a no-op.
    fn terminate(&mut self);

    /// Wait up to `timeout` for the process to exit on its own.
    ///
    /// Returns `true` if it has exited.
    fn wait_for_exit(&mut self, timeout: Duration) -> bool;
}

/// How to start bitcoind.
#[derive(Clone)]
pub struct LaunchConfig {
    /// Path to the bitcoind executable.
    pub binary: PathBuf,
    /// Pass `-testnet`.
    pub testnet: bool,
    /// Value of `-rpcuser`.
    pub account: String,
    /// Value of `-rpcpassword`.
    pub secret: String,
    /// Value of `-datadir`, if set.
    pub data_dir: Option<PathBuf>,
    /// Appended after the generated arguments.
    pub extra_args: Vec<String>,
    /// Where stdout/stderr go; discarded when unset.
    pub log_file: Option<PathBuf>,
    /// Time between SIGTERM and a forced kill.
    pub shutdown_grace: Duration,
}

impl LaunchConfig {
    pub fn new(
        binary: impl AsRef<Path>,
        account: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
            testnet: false,
            account: account.into(),
            secret: secret.into(),
            data_dir: None,
            extra_args: vec![],
            log_file: None,
            shutdown_grace: RpcConfig::SHUTDOWN_GRACE,
        }
    }

    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    pub fn with_data_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    pub fn with_log_file(mut self, path: impl AsRef<Path>) -> Self {
        self.log_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Command-line arguments, in order.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(4 + self.extra_args.len());
        if self.testnet {
            args.push("-testnet".to_string());
        }
        args.push(format!("-rpcuser={}", self.account));
        args.push(format!("-rpcpassword={}", self.secret));
        if let Some(ref dir) = self.data_dir {
            args.push(format!("-datadir={}", dir.display()));
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Arguments safe to log.
    pub fn redacted_args(&self) -> Vec<String> {
        self.args()
            .into_iter()
            .map(|arg| {
                if arg.starts_with("-rpcpassword=") {
                    "-rpcpassword=****".to_string()
                } else {
                    arg
                }
            })
            .collect()
    }
}

impl fmt::Debug for LaunchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchConfig")
            .field("binary", &self.binary)
            .field("testnet", &self.testnet)
            .field("account", &self.account)
            .field("secret", &"****")
            .field("data_dir", &self.data_dir)
            .field("extra_args", &self.extra_args)
            .field("log_file", &self.log_file)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish()
    }
}

/// Starts bitcoind processes.
pub struct DaemonLauncher;

impl DaemonLauncher {
    /// Spawn the daemon described by `config`.
    ///
    /// Returns as soon as the process exists; readiness is the establisher's job.
    pub fn launch(config: &LaunchConfig) -> Result<DaemonProcess, ConnectionError> {
        let launch_failed = |source: std::io::Error| ConnectionError::LaunchFailed {
            binary: config.binary.clone(),
            source,
        };

        let binary = fs::canonicalize(&config.binary).map_err(launch_failed)?;
        info!("Launching {} {:?}", binary.display(), config.redacted_args());

        let mut cmd = Command::new(&binary);
        cmd.args(config.args()).stdin(Stdio::null());

        if let Some(ref log_file) = config.log_file {
            if let Some(parent) = log_file.parent() {
                fs::create_dir_all(parent).map_err(launch_failed)?;
            }
            let file = fs::File::create(log_file).map_err(launch_failed)?;
            let stdout_file = file.try_clone().map_err(launch_failed)?;
            cmd.stdout(Stdio::from(stdout_file));
            cmd.stderr(Stdio::from(file));
        } else {
            cmd.stdout(Stdio::null());
            cmd.stderr(Stdio::null());
        }

        let child = cmd.spawn().map_err(|e| {
            error!("Failed to spawn {}: {}", binary.display(), e);
            launch_failed(e)
        })?;
        debug!("Spawned {} with pid {}", binary.display(), child.id());

        Ok(DaemonProcess {
            child,
            binary,
            grace: config.shutdown_grace,
            finished: false,
        })
    }
}

/// A bitcoind child process owned by this client.
pub struct DaemonProcess {
    child: Child,
    binary: PathBuf,
    grace: Duration,
    finished: bool,
}

impl DaemonProcess {
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn has_exited(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!("Process {} exited with {}", self.child.id(), status);
                self.finished = true;
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to poll process {}: {}", self.child.id(), e);
                false
            }
        }
    }

    #[cfg(unix)]
    fn request_shutdown(&mut self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Ok(raw) = i32::try_from(self.child.id()) else {
            return;
        };
        debug!("Sending SIGTERM to process {}", raw);
        if let Err(e) = kill(Pid::from_raw(raw), Signal::SIGTERM) {
            if e != nix::errno::Errno::ESRCH {
                warn!("Failed to send SIGTERM to {}: {}", raw, e);
            }
        }
    }

    #[cfg(not(unix))]
    fn request_shutdown(&mut self) {}

    fn force_kill(&mut self) {
        let pid = self.child.id();
        debug!("Process {} still running, killing", pid);
        if let Err(e) = self.child.kill() {
            error!("Failed to kill process {}: {}", pid, e);
        }
        match self.child.wait() {
            Ok(_) => self.finished = true,
            Err(e) => error!("Failed to reap process {}: {}", pid, e),
        }
    }
}

impl ManagedProcess for DaemonProcess {
    fn id(&self) -> Option<u32> {
        (!self.finished).then(|| self.child.id())
    }

    fn terminate(&mut self) {
        if self.finished || self.has_exited() {
            return;
        }

        self.request_shutdown();
        if self.wait_for_exit(self.grace) {
            info!("Daemon {} stopped", self.binary.display());
            return;
        }
        self.force_kill();
    }

    fn wait_for_exit(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.finished || self.has_exited() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

impl Drop for DaemonProcess {
    fn drop(&mut self) {
        self.terminate();
    }
}
