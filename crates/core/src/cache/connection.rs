//! Cache connection lifecycle and readiness gate.
//!
//! A [`ConnectionManager`] owns the single shared cache client. The client is
//! built lazily by a background connect loop on first use, and every cache
//! command must pass [`ConnectionManager::await_ready`] first.
//!
//! State transitions:
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> Ready
//!       ^             |            ^          |
//!       +--(backoff)--+            +-(error)--+
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinHandle;

use super::CacheError;
use super::client::{CacheClient, Connector};

/// Lifecycle state of the shared cache connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Transport is up but the protocol has not answered a liveness probe.
    Connected,
    Ready,
}

/// Timing and retry parameters for the connection.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Default readiness wait budget.
    pub ready_timeout: Duration,
    /// Interval between liveness probes while waiting for readiness.
    pub poll_interval: Duration,
    /// Bound on a single connect attempt.
    pub connect_timeout: Duration,
    /// Per-request retry count handed to the client.
    pub max_retries: usize,
    /// First reconnect delay; doubles per failed attempt.
    pub base_backoff: Duration,
    /// Cap on any single reconnect delay.
    pub max_backoff: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(100),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(3000),
        }
    }
}

impl ConnectionSettings {
    /// Reconnect delay after `attempt` consecutive failures.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.base_backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

struct Inner {
    connector: Arc<dyn Connector>,
    settings: ConnectionSettings,
    client: RwLock<Option<Arc<dyn CacheClient>>>,
    state: watch::Sender<ConnectionState>,
    connect_task: Mutex<Option<JoinHandle<()>>>,
    started: AtomicBool,
    closed: AtomicBool,
}

impl Inner {
    fn set_state(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::debug!(from = ?previous, to = ?next, "cache connection state changed");
        }
    }

    /// Install a freshly connected client unless shutdown already ran.
    ///
    /// Holds the client slot while checking `closed`, so a concurrent
    /// shutdown either sees the client and closes it or wins the slot first
    /// and the client is closed here.
    async fn publish(&self, client: Arc<dyn CacheClient>) -> bool {
        let mut slot = self.client.write().await;
        if self.closed.load(Ordering::Acquire) {
            drop(slot);
            if let Err(e) = client.close().await {
                tracing::warn!(error = %e, "failed to close cache client connected during shutdown");
            }
            return false;
        }
        *slot = Some(client);
        self.set_state(ConnectionState::Connected);
        true
    }

    /// Promote to `Ready` unless shutdown already ran.
    async fn mark_ready(&self) -> bool {
        let _slot = self.client.read().await;
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        self.set_state(ConnectionState::Ready);
        true
    }

    async fn connect_loop(self: Arc<Self>) {
        let endpoint = self.connector.target();
        let mut attempt: u32 = 0;

        loop {
            if self.closed.load(Ordering::Acquire) {
                return;
            }
            self.set_state(ConnectionState::Connecting);

            match tokio::time::timeout(self.settings.connect_timeout, self.connector.connect()).await {
                Ok(Ok(client)) => {
                    if !self.publish(client.clone()).await {
                        tracing::debug!(endpoint = %endpoint, "cache connected after shutdown, discarded");
                        return;
                    }
                    tracing::info!(endpoint = %endpoint, attempt, "cache transport connected");

                    match tokio::time::timeout(self.settings.connect_timeout, client.ping()).await {
                        Ok(Ok(())) => {
                            if self.mark_ready().await {
                                tracing::info!(endpoint = %endpoint, "cache connection ready");
                            }
                        }
                        Ok(Err(e)) => tracing::warn!(endpoint = %endpoint, error = %e, "cache handshake probe failed"),
                        Err(_) => tracing::warn!(endpoint = %endpoint, "cache handshake probe timed out"),
                    }
                    return;
                }
                Ok(Err(e)) => tracing::warn!(endpoint = %endpoint, attempt, error = %e, "cache connect failed"),
                Err(_) => tracing::warn!(
                    endpoint = %endpoint,
                    attempt,
                    timeout_ms = self.settings.connect_timeout.as_millis() as u64,
                    "cache connect timed out"
                ),
            }

            self.set_state(ConnectionState::Disconnected);
            let delay = self.settings.backoff(attempt);
            attempt = attempt.saturating_add(1);
            tokio::time::sleep(delay).await;
        }
    }
}

/// Owner of the shared cache client.
///
/// Cheap to clone; clones share the same client and state. Constructed once
/// by the composition root and injected into every cache component.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConnectionManager")
            .field("target", &self.inner.connector.target())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ConnectionManager {
    /// Create a manager. No connection is attempted until first use.
    pub fn new(connector: Arc<dyn Connector>, settings: ConnectionSettings) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                connector,
                settings,
                client: RwLock::new(None),
                state,
                connect_task: Mutex::new(None),
                started: AtomicBool::new(false),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Timings this manager was built with.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.inner.settings
    }

    /// Current state snapshot.
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Whether the last liveness probe succeeded and no transport error followed.
    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    /// The shared client, starting the connect loop on first call.
    ///
    /// Returns `None` while the first connect is still in progress or after
    /// shutdown.
    pub async fn client(&self) -> Option<Arc<dyn CacheClient>> {
        self.ensure_started().await;
        self.inner.client.read().await.clone()
    }

    async fn ensure_started(&self) {
        if self.inner.closed.load(Ordering::Acquire) || self.inner.started.swap(true, Ordering::AcqRel) {
            return;
        }
        let task = tokio::spawn(self.inner.clone().connect_loop());
        *self.inner.connect_task.lock().await = Some(task);
    }

    /// Wait until the connection is ready, probing liveness every poll interval.
    ///
    /// Returns immediately when already ready. Fails with
    /// [`CacheError::ConnectionTimeout`] once `timeout` elapses.
    pub async fn await_ready(&self, timeout: Duration) -> Result<(), CacheError> {
        if self.is_ready() {
            return Ok(());
        }
        self.ensure_started().await;

        let poll = async {
            loop {
                if self.is_ready() {
                    return;
                }
                let client = self.inner.client.read().await.clone();
                if let Some(client) = client
                    && client.ping().await.is_ok()
                    && self.inner.mark_ready().await
                {
                    return;
                }
                tokio::time::sleep(self.inner.settings.poll_interval).await;
            }
        };

        tokio::time::timeout(timeout, poll).await.map_err(|_| {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                state = ?self.state(),
                "cache connection not ready in time"
            );
            CacheError::ConnectionTimeout(timeout)
        })
    }

    /// Record a transport failure seen by a cache command.
    ///
    /// Demotes `Ready` to `Connected` so the next readiness check re-probes
    /// liveness instead of trusting a stale state.
    pub fn report_transport_error(&self) {
        self.inner.state.send_if_modified(|state| {
            if *state == ConnectionState::Ready {
                *state = ConnectionState::Connected;
                true
            } else {
                false
            }
        });
    }

    /// Close the client. Idempotent; close failures are logged and swallowed.
    pub async fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(task) = self.inner.connect_task.lock().await.take() {
            task.abort();
        }
        let client = {
            let mut slot = self.inner.client.write().await;
            self.inner.set_state(ConnectionState::Disconnected);
            slot.take()
        };
        if let Some(client) = client
            && let Err(e) = client.close().await
        {
            tracing::warn!(error = %e, "failed to close cache client");
        }
        tracing::info!(endpoint = %self.inner.connector.target(), "cache connection closed");
    }
}
