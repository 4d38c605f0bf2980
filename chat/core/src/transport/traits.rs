//! Transport Traits
//!
//! The client side of the chat connection. A transport owns exactly one
//! connection for one session, sends encoded envelopes, and surfaces inbound
//! text frames and connection loss as [`TransportEvent`]s in arrival order.
//! It contains no business logic.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::events::ClientEnvelope;

/// Something that arrived on the inbound side of the connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// A complete text frame
    Frame(String),
    /// The peer closed the connection
    Closed {
        /// Close reason given by the peer, if any
        reason: Option<String>,
    },
    /// The connection failed
    Error(String),
}

impl TransportEvent {
    /// Whether no further events will follow this one
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Frame(_))
    }
}

/// Errors that can occur during transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection to the backend failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection attempt took too long
    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),

    /// Connection was closed
    #[error("Connection closed")]
    ConnectionClosed,

    /// Failed to send a frame
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Envelope could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error from the underlying socket
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport not in the expected state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Client-side transport for one chat session
///
/// `send` on a transport that is not connected is rejected with
/// [`TransportError::InvalidState`]; nothing is queued. There is no
/// automatic reconnection.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Open the connection
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Close the connection gracefully
    async fn disconnect(&mut self) -> Result<(), TransportError>;

    /// Encode and send one envelope
    async fn send(&self, envelope: &ClientEnvelope) -> Result<(), TransportError>;

    /// Receive the next inbound event (waits until one is available)
    async fn recv(&mut self) -> Result<TransportEvent, TransportError>;

    /// Receive the next inbound event if one is ready
    fn try_recv(&mut self) -> Option<TransportEvent>;

    /// Whether the connection is currently open
    fn is_connected(&self) -> bool;
}
