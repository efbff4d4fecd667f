//! Transport abstraction for the notification stream
//!
//! The channel consumes events through this trait so the reconnect and
//! debounce logic can be exercised against an in-memory transport in tests
//! while production uses the SSE transport.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use shared::ChannelEvent;
use tokio::sync::broadcast;

use crate::channel::sse::SseParser;
use crate::config::{ClientConfig, ClientRole};
use crate::error::{ClientError, ClientResult};

/// Stream of decoded channel events from one connection
pub type EventStream = Pin<Box<dyn Stream<Item = ClientResult<ChannelEvent>> + Send>>;

/// One connectable notification source
#[async_trait]
pub trait EventTransport: Send + Sync + std::fmt::Debug {
    /// Open a stream scoped to one tenant. The stream ends or errors when
    /// the underlying connection drops; reconnecting is the caller's job.
    async fn connect(
        &self,
        tenant_id: &str,
        token: Option<&str>,
        role: ClientRole,
    ) -> ClientResult<EventStream>;
}

/// SSE transport over a long-lived chunked GET
#[derive(Debug, Clone)]
pub struct SseTransport {
    client: reqwest::Client,
    base_url: String,
}

impl SseTransport {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        // No overall request timeout: the stream is meant to live forever.
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build SSE client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl EventTransport for SseTransport {
    async fn connect(
        &self,
        tenant_id: &str,
        token: Option<&str>,
        role: ClientRole,
    ) -> ClientResult<EventStream> {
        let url = format!(
            "{}/api/notifications/stream?tenant_id={tenant_id}&role={role}",
            self.base_url
        );
        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        if let Some(token) = token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Connection(format!(
                "Notification stream rejected: {}",
                response.status()
            )));
        }

        let bytes = response.bytes_stream();
        let stream = futures::stream::try_unfold(
            (bytes, SseParser::new(), std::collections::VecDeque::new()),
            |(mut bytes, mut parser, mut ready)| async move {
                loop {
                    if let Some(frame) = ready.pop_front() {
                        let event = ChannelEvent::from(frame);
                        return Ok(Some((event, (bytes, parser, ready))));
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => ready.extend(parser.feed(&chunk)),
                        Some(Err(e)) => return Err(ClientError::Http(e)),
                        None => return Ok(None),
                    }
                }
            },
        );
        Ok(Box::pin(stream))
    }
}

/// In-memory transport for in-process use and tests
///
/// Events pushed through [`MemoryTransport::send`] reach every open stream.
/// [`MemoryTransport::reset`] drops the current streams, which consumers
/// observe as a transport close.
#[derive(Debug)]
pub struct MemoryTransport {
    sender: std::sync::Mutex<broadcast::Sender<ChannelEvent>>,
    connects: std::sync::Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            sender: std::sync::Mutex::new(tx),
            connects: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Broadcast an event to all open streams
    pub fn send(&self, event: ChannelEvent) {
        let _ = self
            .sender
            .lock()
            .expect("transport lock poisoned")
            .send(event);
    }

    /// Simulate a transport drop: all open streams end
    pub fn reset(&self) {
        let (tx, _) = broadcast::channel(64);
        *self.sender.lock().expect("transport lock poisoned") = tx;
    }

    /// Tenant ids seen by each connection attempt, in order
    pub fn connect_log(&self) -> Vec<String> {
        self.connects
            .lock()
            .expect("transport lock poisoned")
            .clone()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventTransport for MemoryTransport {
    async fn connect(
        &self,
        tenant_id: &str,
        _token: Option<&str>,
        _role: ClientRole,
    ) -> ClientResult<EventStream> {
        self.connects
            .lock()
            .expect("transport lock poisoned")
            .push(tenant_id.to_string());
        let rx = self
            .sender
            .lock()
            .expect("transport lock poisoned")
            .subscribe();

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((Ok(event), rx)),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Memory transport lagged {n} events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(Box::pin(stream))
    }
}
