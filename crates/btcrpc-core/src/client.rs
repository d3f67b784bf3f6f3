//! The connected client handle.

use crate::config::{ConnectionConfig, RpcConfig};
use crate::error::{BtcRpcError, Result};
use crate::models::{decode, DaemonStatus};
use crate::process::ManagedProcess;
use crate::rpc::{Params, RpcChannel, RpcMethod};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// A client for a daemon that answered the readiness probe.
///
/// Only [`Establisher`](crate::Establisher) creates one. If the client launched
/// the daemon it owns the process: [`stop`](Self::stop) shuts it down
/// cleanly and dropping the client terminates it.
pub struct DaemonClient {
    channel: RpcChannel,
    config: ConnectionConfig,
    status: DaemonStatus,
    process: Mutex<Option<Box<dyn ManagedProcess>>>,
}

impl DaemonClient {
    pub(crate) fn new(
        channel: RpcChannel,
        config: ConnectionConfig,
        status: DaemonStatus,
        process: Option<Box<dyn ManagedProcess>>,
    ) -> Self {
        Self {
            channel,
            config,
            status,
            process: Mutex::new(process),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// What the daemon reported when the connection was established.
    pub fn status(&self) -> &DaemonStatus {
        &self.status
    }

    /// Whether this client launched, and still owns, the daemon process.
    pub fn owns_process(&self) -> bool {
        self.lock_process().is_some()
    }

    /// Invoke a catalogued method.
    ///
    /// Methods the client does not wire fail with
    /// [`BtcRpcError::Unsupported`] without touching the network.
    pub async fn invoke(&self, method: RpcMethod, params: Params) -> Result<Value> {
        if !method.is_supported() {
            return Err(BtcRpcError::Unsupported(method));
        }
        self.channel.call(method.as_str(), params).await
    }

    /// Invoke a catalogued method and decode its result.
    pub async fn invoke_as<T: DeserializeOwned>(
        &self,
        method: RpcMethod,
        params: Params,
    ) -> Result<T> {
        let value = self.invoke(method, params).await?;
        Ok(decode(method.as_str(), value)?)
    }

    /// Invoke a method by wire name.
    ///
    /// Catalogued names go through [`invoke`](Self::invoke); names outside the
    /// catalogue (newer daemon methods) are sent as-is.
    pub async fn call(&self, method: &str, params: Params) -> Result<Value> {
        match RpcMethod::from_wire_name(method) {
            Some(known) => self.invoke(known, params).await,
            None => self.channel.call(method, params).await,
        }
    }

    /// Invoke a method by wire name and decode its result.
    pub async fn call_as<T: DeserializeOwned>(&self, method: &str, params: Params) -> Result<T> {
        let value = self.call(method, params).await?;
        Ok(decode(method, value)?)
    }

    /// Ask the daemon to shut down.
    ///
    /// Returns the daemon's acknowledgement. An owned process is then given
    /// the shutdown grace period to exit before it is terminated.
    pub async fn stop(&self) -> Result<String> {
        let message: String = self.invoke_as(RpcMethod::Stop, Params::None).await?;
        info!("{}", message);

        let process = self.lock_process().take();
        if let Some(mut process) = process {
            let reaped = tokio::task::spawn_blocking(move || {
                if !process.wait_for_exit(RpcConfig::SHUTDOWN_GRACE) {
                    warn!("Daemon did not exit after stop, terminating");
                    process.terminate();
                }
            })
            .await;
            if let Err(e) = reaped {
                warn!("Failed to reap daemon process: {}", e);
            }
        }
        Ok(message)
    }

    fn lock_process(&self) -> MutexGuard<'_, Option<Box<dyn ManagedProcess>>> {
        self.process.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for DaemonClient {
    fn drop(&mut self) {
        let process = self
            .process
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(mut process) = process {
            debug!("Client dropped, terminating owned daemon");
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn_blocking(move || process.terminate());
                }
                Err(_) => process.terminate(),
            }
        }
    }
}

impl fmt::Debug for DaemonClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaemonClient")
            .field("config", &self.config)
            .field("version", &self.status.version)
            .field("owns_process", &self.owns_process())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::rpc::Transport;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;

    /// Answers every request with `result`, echoing the request id, and
    /// records the last request body.
    pub(crate) struct ScriptedTransport {
        pub result: Value,
        pub calls: AtomicU32,
        pub last_request: Mutex<Option<Value>>,
    }

    impl ScriptedTransport {
        pub fn new(result: Value) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicU32::new(0),
                last_request: Mutex::new(None),
            })
        }

        pub fn last_request(&self) -> Value {
            self.last_request
                .lock()
                .unwrap()
                .clone()
                .expect("no request was sent")
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, body: Vec<u8>) -> std::result::Result<Vec<u8>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let request: Value = serde_json::from_slice(&body).unwrap();
            let response = json!({"id": request["id"], "result": self.result, "error": null});
            *self.last_request.lock().unwrap() = Some(request);
            Ok(serde_json::to_vec(&response).unwrap())
        }
    }

    /// Counts termination requests.
    #[derive(Default, Clone)]
    pub(crate) struct CountingProcess {
        pub terminated: Arc<AtomicU32>,
    }

    impl ManagedProcess for CountingProcess {
        fn id(&self) -> Option<u32> {
            Some(4242)
        }

        fn terminate(&mut self) {
            self.terminated.fetch_add(1, Ordering::SeqCst);
        }

        fn wait_for_exit(&mut self, _timeout: Duration) -> bool {
            true
        }
    }

    pub(crate) fn client_over(
        transport: Arc<dyn Transport>,
        process: Option<Box<dyn ManagedProcess>>,
    ) -> DaemonClient {
        let config = ConnectionConfig::new(
            Url::parse("http://127.0.0.1:18332").unwrap(),
            "user",
            "pw",
        );
        DaemonClient::new(
            RpcChannel::new(transport),
            config,
            DaemonStatus::default(),
            process,
        )
    }

    #[tokio::test]
    async fn test_unsupported_method_makes_no_request() {
        let transport = ScriptedTransport::new(json!(null));
        let client = client_over(transport.clone(), None);

        let err = client
            .invoke(RpcMethod::SendToAddress, Params::positional(["addr"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BtcRpcError::Unsupported(RpcMethod::SendToAddress)
        ));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_call_by_name_respects_catalogue() {
        let transport = ScriptedTransport::new(json!(7));
        let client = client_over(transport.clone(), None);

        let err = client.call("dumpprivkey", Params::None).await.unwrap_err();
        assert!(matches!(err, BtcRpcError::Unsupported(RpcMethod::DumpPrivKey)));

        let count: u64 = client.call_as("getblockcount", Params::None).await.unwrap();
        assert_eq!(count, 7);

        // unknown names pass through
        let value = client.call("getnetworkinfo", Params::None).await.unwrap();
        assert_eq!(value, json!(7));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stop_reaps_owned_process() {
        let transport = ScriptedTransport::new(json!("Bitcoin server stopping"));
        let process = CountingProcess::default();
        let client = client_over(transport.clone(), Some(Box::new(process.clone())));
        assert!(client.owns_process());

        let message = client.stop().await.unwrap();
        assert_eq!(message, "Bitcoin server stopping");
        assert_eq!(transport.last_request()["method"], "stop");
        assert!(!client.owns_process());

        // exited on its own within the grace period
        drop(client);
        assert_eq!(process.terminated.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_drop_terminates_owned_process() {
        let process = CountingProcess::default();
        let client = client_over(ScriptedTransport::new(json!(null)), Some(Box::new(process.clone())));

        drop(client);
        for _ in 0..100 {
            if process.terminated.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(process.terminated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_outside_runtime_terminates_inline() {
        let process = CountingProcess::default();
        let client = client_over(ScriptedTransport::new(json!(null)), Some(Box::new(process.clone())));

        drop(client);
        assert_eq!(process.terminated.load(Ordering::SeqCst), 1);
    }

    /// Stops only after a delay, like a daemon using its shutdown grace.
    struct SlowProcess {
        terminated: Arc<AtomicU32>,
    }

    impl ManagedProcess for SlowProcess {
        fn id(&self) -> Option<u32> {
            Some(4244)
        }

        fn terminate(&mut self) {
            std::thread::sleep(Duration::from_millis(300));
            self.terminated.fetch_add(1, Ordering::SeqCst);
        }

        fn wait_for_exit(&mut self, _timeout: Duration) -> bool {
            false
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_drop_in_runtime_does_not_block() {
        let terminated = Arc::new(AtomicU32::new(0));
        let process = SlowProcess {
            terminated: terminated.clone(),
        };
        let client = client_over(ScriptedTransport::new(json!(null)), Some(Box::new(process)));

        let started = std::time::Instant::now();
        drop(client);
        assert!(started.elapsed() < Duration::from_millis(200));

        for _ in 0..100 {
            if terminated.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(terminated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DaemonClient>();
    }
}
