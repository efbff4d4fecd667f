//! Change-notification channel
//!
//! Maintains a long-lived push connection scoped to the resolved tenant and
//! translates inbound change notifications into store refreshes. Bursts of
//! qualifying events are coalesced through a trailing debounce into a
//! single refresh; lane open/close events additionally get immediate
//! dedicated handling. A dropped transport is re-established after a fixed
//! delay, indefinitely, until the channel is torn down; each re-established
//! stream starts with a full refresh to cover the outage.

pub mod sse;
pub mod transport;

use std::sync::Arc;

use futures::StreamExt;
use shared::ChannelEvent;
use tokio::sync::watch;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, ClientRole};
use crate::store::{ConnectionState, QueueStore};
use crate::tenant::TenantResolver;
use transport::{EventStream, EventTransport};

/// Handle to the spawned channel worker
pub struct NotificationChannel {
    shutdown: CancellationToken,
}

impl NotificationChannel {
    /// Spawn the channel worker
    ///
    /// The worker resolves the tenant per connection attempt and exits only
    /// on [`NotificationChannel::shutdown`] or server eviction.
    pub fn spawn(
        store: Arc<QueueStore>,
        tenants: Arc<TenantResolver>,
        transport: Arc<dyn EventTransport>,
        config: &ClientConfig,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let worker = ChannelWorker {
            store,
            tenants,
            transport,
            role: config.role,
            debounce_window: config.debounce_window,
            reconnect_delay: config.reconnect_delay,
            shutdown: shutdown.clone(),
        };
        tokio::spawn(worker.run());
        Self { shutdown }
    }

    /// Tear the channel down: cancels any pending debounce and reconnect
    /// timers; nothing fires afterwards.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Why the event pump stopped consuming a stream
enum StreamExit {
    Shutdown,
    TenantChanged,
    Evicted,
    Dropped,
}

struct ChannelWorker {
    store: Arc<QueueStore>,
    tenants: Arc<TenantResolver>,
    transport: Arc<dyn EventTransport>,
    role: ClientRole,
    debounce_window: Duration,
    reconnect_delay: Duration,
    shutdown: CancellationToken,
}

impl ChannelWorker {
    async fn run(self) {
        let mut tenant_changes = self.tenants.subscribe();
        // A stream opened after a drop starts with a full refresh: events
        // received just before the drop may have had their debounced
        // refresh pending, and events during the outage were never seen.
        let mut resync_on_connect = false;

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }
            // The connection we are about to open uses a fresh resolve(),
            // so any selection change up to this point is accounted for.
            let _ = tenant_changes.borrow_and_update();

            let Some(tenant) = self.tenants.resolve() else {
                // No tenant resolvable; stay idle until one is selected.
                tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    changed = tenant_changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                }
            };

            self.store.set_connection_state(ConnectionState::Connecting).await;
            let token = self.tenants.token();

            let connected = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = self.transport.connect(&tenant, token.as_deref(), self.role) => result,
            };

            match connected {
                Ok(stream) => {
                    tracing::info!(tenant_id = %tenant, "Notification stream connected");
                    self.store.set_connection_state(ConnectionState::Connected).await;
                    if resync_on_connect {
                        resync_on_connect = false;
                        self.store.refresh_all().await;
                    }

                    match self.pump(stream, &mut tenant_changes).await {
                        StreamExit::Shutdown => break,
                        StreamExit::TenantChanged => {
                            tracing::info!("Tenant changed, re-establishing stream");
                            continue;
                        }
                        StreamExit::Evicted => {
                            tracing::warn!("Evicted by server connection limit, channel stopping");
                            self.store.set_connection_state(ConnectionState::Blocked).await;
                            break;
                        }
                        StreamExit::Dropped => {
                            resync_on_connect = true;
                            self.store
                                .set_connection_state(ConnectionState::Disconnected)
                                .await;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(tenant_id = %tenant, "Notification stream connect failed: {e}");
                    resync_on_connect = true;
                    self.store
                        .set_connection_state(ConnectionState::Disconnected)
                        .await;
                }
            }

            // Fixed-delay reconnect. No backoff growth and no retry cap:
            // the staff dashboard session is semi-permanent.
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
        tracing::debug!("Notification channel worker exited");
    }

    /// Consume one stream until it drops, the tenant changes, the server
    /// evicts us, or the channel is torn down.
    async fn pump(
        &self,
        mut stream: EventStream,
        tenant_changes: &mut watch::Receiver<u64>,
    ) -> StreamExit {
        let mut debounce_deadline: Option<Instant> = None;

        loop {
            let flush_at =
                debounce_deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                _ = self.shutdown.cancelled() => return StreamExit::Shutdown,

                changed = tenant_changes.changed() => {
                    if changed.is_err() {
                        return StreamExit::Shutdown;
                    }
                    return StreamExit::TenantChanged;
                }

                _ = tokio::time::sleep_until(flush_at), if debounce_deadline.is_some() => {
                    debounce_deadline = None;
                    self.store.refresh_all().await;
                }

                item = stream.next() => match item {
                    Some(Ok(event)) => {
                        if let Some(exit) = self.handle_event(event, &mut debounce_deadline).await {
                            return exit;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!("Notification stream error: {e}");
                        return StreamExit::Dropped;
                    }
                    None => {
                        tracing::info!("Notification stream closed by server");
                        return StreamExit::Dropped;
                    }
                }
            }
        }
    }

    async fn handle_event(
        &self,
        event: ChannelEvent,
        debounce_deadline: &mut Option<Instant>,
    ) -> Option<StreamExit> {
        match &event {
            ChannelEvent::Ping => {}
            ChannelEvent::Evicted => return Some(StreamExit::Evicted),
            ChannelEvent::Unknown(tag) => {
                tracing::debug!(tag = %tag, "Ignoring unrecognized notification");
            }
            // Lane open/close gets immediate handling for instant UI
            // feedback; the debounced refresh still follows as
            // reconciliation.
            ChannelEvent::LaneClosed { lane_id } => {
                if let Some(lane_id) = lane_id {
                    self.store.handle_lane_closed(lane_id).await;
                }
                *debounce_deadline = Some(Instant::now() + self.debounce_window);
            }
            ChannelEvent::LaneReopened { lane_id } => {
                if let Some(lane_id) = lane_id {
                    self.store.handle_lane_reopened(lane_id).await;
                }
                *debounce_deadline = Some(Instant::now() + self.debounce_window);
            }
            _ if event.is_mutation() => {
                *debounce_deadline = Some(Instant::now() + self.debounce_window);
            }
            _ => {}
        }
        None
    }
}
