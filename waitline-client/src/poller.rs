//! Polling fallback loop
//!
//! Backstop for the push channel: periodically asks the backend for the
//! current sync token and triggers a full store refresh only when it
//! differs from the last observed value. Cheap enough to run alongside the
//! channel; sufficient on its own when push is unavailable.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::QueueApi;
use crate::config::ClientConfig;
use crate::store::{ConnectionState, QueueStore};
use crate::tenant::TenantResolver;

/// Handle to the spawned polling worker
pub struct SyncPoller {
    shutdown: CancellationToken,
    wake_tx: mpsc::Sender<()>,
}

impl SyncPoller {
    /// Spawn the polling worker
    pub fn spawn(
        store: Arc<QueueStore>,
        api: Arc<dyn QueueApi>,
        tenants: Arc<TenantResolver>,
        config: &ClientConfig,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let (wake_tx, wake_rx) = mpsc::channel(8);
        let worker = PollWorker {
            store,
            api,
            tenants,
            interval: config.poll_interval,
            shutdown: shutdown.clone(),
        };
        tokio::spawn(worker.run(wake_rx));
        Self { shutdown, wake_tx }
    }

    /// Request an immediate revalidation, ahead of the next timer tick.
    ///
    /// Wired to window-focus and network-reconnect notifications so a
    /// backgrounded dashboard catches up the moment the user returns.
    pub fn wake(&self) {
        let _ = self.wake_tx.try_send(());
    }

    /// Stop the polling loop
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

struct PollWorker {
    store: Arc<QueueStore>,
    api: Arc<dyn QueueApi>,
    tenants: Arc<TenantResolver>,
    interval: std::time::Duration,
    shutdown: CancellationToken,
}

impl PollWorker {
    async fn run(self, mut wake_rx: mpsc::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_token: Option<String> = None;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => self.tick(&mut last_token).await,
                Some(_) = wake_rx.recv() => self.tick(&mut last_token).await,
            }
        }
        tracing::debug!("Sync poller exited");
    }

    async fn tick(&self, last_token: &mut Option<String>) {
        // Suspended while no tenant resolves.
        let Some(tenant) = self.tenants.resolve() else {
            return;
        };

        match self.api.sync_status(&tenant).await {
            Ok(status) => {
                // A successful poll counts as liveness, independent of the
                // push channel. Blocked is left alone: eviction feedback
                // must stay visible.
                let state = self.store.connection_state().await;
                if state != ConnectionState::Connected && state != ConnectionState::Blocked {
                    self.store
                        .set_connection_state(ConnectionState::Connected)
                        .await;
                }

                if last_token.as_deref() != Some(status.sync_token.as_str()) {
                    tracing::debug!(tenant_id = %tenant, "Sync token changed, refreshing");
                    self.store.refresh_all().await;
                    *last_token = Some(status.sync_token);
                }
            }
            Err(e) => {
                // Logged only: a transient poll failure neither stops the
                // loop nor degrades the connectivity indicator.
                tracing::warn!(tenant_id = %tenant, "Sync token poll failed: {e}");
            }
        }
    }
}
