//! In-Process Transport
//!
//! Channel-backed transport for embedding a backend in the same process and
//! for driving sessions in tests. Envelopes are still encoded to JSON text so
//! the peer sees exactly what would go over a socket.
//!
//! # Usage
//!
//! ```ignore
//! let (transport, mut frames, events) = InProcessTransport::new_pair();
//!
//! // The peer reads encoded envelopes from `frames`
//! // and pushes inbound events through `events`.
//! events.send(TransportEvent::Frame(r#"{"type":"tool_call","name":"x"}"#.into())).await?;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::events::ClientEnvelope;

use super::traits::{ChatTransport, TransportError, TransportEvent};

/// In-process transport using tokio channels
pub struct InProcessTransport {
    /// Encoded envelopes out to the peer
    frame_tx: mpsc::Sender<String>,
    /// Events in from the peer
    event_rx: mpsc::Receiver<TransportEvent>,
    /// Connection state
    connected: Arc<AtomicBool>,
    /// Set by the first `connect`; never cleared
    used: bool,
}

impl InProcessTransport {
    /// Create a transport and the peer's ends of its channels
    ///
    /// Returns:
    /// - `InProcessTransport`: give this to the session driver
    /// - `mpsc::Receiver<String>`: the peer reads encoded envelopes here
    /// - `mpsc::Sender<TransportEvent>`: the peer pushes inbound events here
    #[must_use]
    pub fn new_pair() -> (Self, mpsc::Receiver<String>, mpsc::Sender<TransportEvent>) {
        Self::new_pair_with_capacity(100)
    }

    /// Create with custom channel capacity
    #[must_use]
    pub fn new_pair_with_capacity(
        capacity: usize,
    ) -> (Self, mpsc::Receiver<String>, mpsc::Sender<TransportEvent>) {
        let (frame_tx, frame_rx) = mpsc::channel(capacity);
        let (event_tx, event_rx) = mpsc::channel(capacity);

        let transport = Self {
            frame_tx,
            event_rx,
            connected: Arc::new(AtomicBool::new(false)),
            used: false,
        };

        (transport, frame_rx, event_tx)
    }
}

#[async_trait]
impl ChatTransport for InProcessTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.used {
            return Err(TransportError::InvalidState(
                "Transport already used for a connection".to_string(),
            ));
        }
        self.used = true;
        if self.frame_tx.is_closed() {
            return Err(TransportError::ConnectionFailed(
                "Peer dropped its frame receiver".to_string(),
            ));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);
        self.event_rx.close();
        Ok(())
    }

    async fn send(&self, envelope: &ClientEnvelope) -> Result<(), TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::InvalidState(
                "Transport not connected".to_string(),
            ));
        }

        let frame = envelope.to_frame()?;
        self.frame_tx
            .send(frame)
            .await
            .map_err(|_| TransportError::SendFailed("Channel closed".to_string()))
    }

    async fn recv(&mut self) -> Result<TransportEvent, TransportError> {
        let event = self
            .event_rx
            .recv()
            .await
            .ok_or(TransportError::ConnectionClosed)?;
        if event.is_terminal() {
            self.connected.store(false, Ordering::SeqCst);
        }
        Ok(event)
    }

    fn try_recv(&mut self) -> Option<TransportEvent> {
        let event = self.event_rx.try_recv().ok()?;
        if event.is_terminal() {
            self.connected.store(false, Ordering::SeqCst);
        }
        Some(event)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
