//! WebSocket Transport
//!
//! Connects to the report chat backend's `/ws` endpoint. After the
//! handshake the socket is split into a reader task and a writer task,
//! linked to the transport by bounded channels, so `send` and `recv` never
//! block each other.
//!
//! # Lifecycle
//!
//! One transport owns one connection. `disconnect` sends a Close frame and
//! waits briefly for the writer to flush it. Dropping the transport aborts
//! both tasks, so the socket is released on every exit path. Nothing is
//! retried: a failed or closed connection surfaces as a terminal
//! [`TransportEvent`] and stays closed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::config::ClientConfig;
use crate::events::ClientEnvelope;

use super::traits::{ChatTransport, TransportError, TransportEvent};

/// How long `disconnect` waits for the Close frame to go out
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// WebSocket transport for one chat session
pub struct WebSocketTransport {
    /// Endpoint URL (`ws://` or `wss://`)
    url: String,
    /// Limit on the connect + handshake phase
    connect_timeout: Duration,
    /// Capacity of the reader and writer channels
    channel_capacity: usize,
    /// Inbound events from the reader task
    event_rx: Option<mpsc::Receiver<TransportEvent>>,
    /// Outbound frames to the writer task
    frame_tx: Option<mpsc::Sender<Message>>,
    /// Whether the connection is open
    connected: Arc<AtomicBool>,
    /// Reader task
    reader: Option<JoinHandle<()>>,
    /// Writer task
    writer: Option<JoinHandle<()>>,
    /// Set by the first `connect`; never cleared
    used: bool,
}

impl WebSocketTransport {
    /// Create a transport for `url` (not yet connected)
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(5),
            channel_capacity: 100,
            event_rx: None,
            frame_tx: None,
            connected: Arc::new(AtomicBool::new(false)),
            reader: None,
            writer: None,
            used: false,
        }
    }

    /// Create a transport for the configured chat endpoint
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.websocket_url())
            .with_connect_timeout(config.session.connect_timeout)
            .with_channel_capacity(config.session.channel_capacity)
    }

    /// Set the connect timeout
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the channel capacity
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Endpoint URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn abort_tasks(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if let Some(writer) = self.writer.take() {
            writer.abort();
        }
    }
}

#[async_trait]
impl ChatTransport for WebSocketTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.used {
            return Err(TransportError::InvalidState(
                "Transport already used for a connection".to_string(),
            ));
        }
        self.used = true;

        let (stream, _response) =
            tokio::time::timeout(self.connect_timeout, connect_async(self.url.as_str()))
                .await
                .map_err(|_| TransportError::Timeout(self.connect_timeout))?
                .map_err(|e| {
                    TransportError::ConnectionFailed(format!(
                        "Failed to connect to {}: {}",
                        self.url, e
                    ))
                })?;

        let (mut sink, mut source) = stream.split();

        let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(self.channel_capacity);
        let (frame_tx, mut frame_rx) = mpsc::channel::<Message>(self.channel_capacity);

        self.connected.store(true, Ordering::SeqCst);

        // Reader: socket -> event_tx, in arrival order
        let connected_read = Arc::clone(&self.connected);
        let reader = tokio::spawn(async move {
            let terminal = loop {
                match source.next().await {
                    Some(Ok(Message::Text(text))) => {
                        if event_tx.send(TransportEvent::Frame(text)).await.is_err() {
                            tracing::debug!("Event receiver dropped");
                            break None;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| f.reason.into_owned())
                            .filter(|r| !r.is_empty());
                        tracing::debug!(reason = ?reason, "Connection closed by server");
                        break Some(TransportEvent::Closed { reason });
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "WebSocket read error");
                        break Some(TransportEvent::Error(e.to_string()));
                    }
                    None => break Some(TransportEvent::Closed { reason: None }),
                }
            };

            connected_read.store(false, Ordering::SeqCst);
            if let Some(event) = terminal {
                let _ = event_tx.send(event).await;
            }
        });

        // Writer: frame_rx -> socket
        let connected_write = Arc::clone(&self.connected);
        let writer = tokio::spawn(async move {
            while let Some(message) = frame_rx.recv().await {
                let closing = matches!(message, Message::Close(_));
                if let Err(e) = sink.send(message).await {
                    tracing::warn!(error = %e, "WebSocket write error");
                    break;
                }
                if closing {
                    break;
                }
            }

            connected_write.store(false, Ordering::SeqCst);
            let _ = sink.close().await;
        });

        self.event_rx = Some(event_rx);
        self.frame_tx = Some(frame_tx);
        self.reader = Some(reader);
        self.writer = Some(writer);

        tracing::info!(url = %self.url, "Connected to chat backend");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);

        if let Some(frame_tx) = self.frame_tx.take() {
            let _ = frame_tx.send(Message::Close(None)).await;
        }
        if let Some(writer) = self.writer.take() {
            if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, writer).await.is_err() {
                tracing::debug!("Close frame not flushed in time");
            }
        }
        self.abort_tasks();
        self.event_rx = None;

        tracing::info!(url = %self.url, "Disconnected from chat backend");
        Ok(())
    }

    async fn send(&self, envelope: &ClientEnvelope) -> Result<(), TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::InvalidState("Not connected".to_string()));
        }

        let frame_tx = self
            .frame_tx
            .as_ref()
            .ok_or_else(|| TransportError::InvalidState("Not connected".to_string()))?;

        let frame = envelope.to_frame()?;
        tracing::debug!(kind = envelope.kind(), "Sending envelope");
        frame_tx
            .send(Message::Text(frame))
            .await
            .map_err(|_| TransportError::SendFailed("Writer task stopped".to_string()))
    }

    async fn recv(&mut self) -> Result<TransportEvent, TransportError> {
        match self.event_rx.as_mut() {
            Some(rx) => rx.recv().await.ok_or(TransportError::ConnectionClosed),
            None => Err(TransportError::InvalidState("Not connected".to_string())),
        }
    }

    fn try_recv(&mut self) -> Option<TransportEvent> {
        self.event_rx.as_mut()?.try_recv().ok()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.connected.store(false, Ordering::SeqCst);
        self.abort_tasks();
    }
}
