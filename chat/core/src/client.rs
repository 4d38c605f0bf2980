//! Chat Client
//!
//! Drives one [`ChatSession`] over one [`ChatTransport`]. The session decides,
//! the client carries: user actions go through the session's guards first and
//! only the envelopes it hands back are sent; inbound frames are decoded and
//! applied strictly in arrival order.
//!
//! # Example
//!
//! ```ignore
//! let transport = WebSocketTransport::from_config(&config);
//! let session = ChatSession::new(chat_id, config.session.default_profile, Some(&label));
//! let mut client = ChatClient::new(transport, session);
//!
//! client.open().await?;
//! client.reports_loaded().await?; // releases initChat
//! client.send_message("What does the F1 score mean here?").await?;
//!
//! while let Some(updates) = client.next_update().await {
//!     render(client.session(), &updates);
//! }
//! ```

use thiserror::Error;
use tracing::Instrument;

use crate::decoder::decode;
use crate::events::ClientEnvelope;
use crate::profile::Profile;
use crate::session::{ChatSession, LinkState, SendRejected, SessionUpdate};
use crate::transport::{ChatTransport, TransportError, TransportEvent};

/// Why a client operation did not complete
#[derive(Debug, Error)]
pub enum ClientError {
    /// The session refused the action; nothing was sent
    #[error(transparent)]
    Rejected(#[from] SendRejected),

    /// The transport failed; the session is now closed
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// One chat session bound to one connection
pub struct ChatClient<T: ChatTransport> {
    session: ChatSession,
    transport: T,
    span: tracing::Span,
}

impl<T: ChatTransport> ChatClient<T> {
    /// Pair a session with the transport that will carry it
    pub fn new(transport: T, session: ChatSession) -> Self {
        let span = tracing::info_span!(
            "chat_session",
            session_id = %session.id(),
            chat_id = %session.chat_id()
        );
        Self {
            session,
            transport,
            span,
        }
    }

    /// The session state
    #[must_use]
    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// The underlying transport
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Connect the transport
    ///
    /// Sends `initChat` if the report list has already loaded. A session
    /// connects at most once; a closed session stays closed.
    ///
    /// # Errors
    ///
    /// Returns `SendRejected::AlreadyOpened` if the session is past
    /// `Connecting`, without touching the transport. Returns the transport
    /// error if the connection cannot be opened; the session is closed with
    /// that error as its reason.
    pub async fn open(&mut self) -> Result<Vec<SessionUpdate>, ClientError> {
        let span = self.span.clone();
        async {
            if self.session.link_state() != LinkState::Connecting {
                tracing::debug!(link = ?self.session.link_state(), "Ignoring second open");
                return Err(SendRejected::AlreadyOpened.into());
            }

            if let Err(e) = self.transport.connect().await {
                tracing::warn!(error = %e, "Failed to open chat connection");
                self.session.connection_closed(Some(e.to_string()));
                return Err(e.into());
            }

            tracing::info!("Chat connection open");
            let init = self.session.connection_opened();
            if let Some(envelope) = init {
                self.dispatch(envelope).await?;
            }
            Ok(vec![SessionUpdate::LinkChanged(LinkState::Open)])
        }
        .instrument(span)
        .await
    }

    /// Record that the report list has loaded
    ///
    /// Sends `initChat` if the connection is already open.
    ///
    /// # Errors
    ///
    /// Returns the transport error if `initChat` could not be sent.
    pub async fn reports_loaded(&mut self) -> Result<(), ClientError> {
        let span = self.span.clone();
        async {
            if let Some(envelope) = self.session.reports_loaded() {
                self.dispatch(envelope).await?;
            }
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Send a user message
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Rejected` if the session refused the message
    /// (nothing is sent or recorded), or a transport error.
    pub async fn send_message(&mut self, content: &str) -> Result<Vec<SessionUpdate>, ClientError> {
        let span = self.span.clone();
        async {
            let envelope = self.session.send_message(content)?;
            self.send_turn(envelope).await
        }
        .instrument(span)
        .await
    }

    /// Send the prompt of the quick action at `index`
    ///
    /// # Errors
    ///
    /// Same as [`ChatClient::send_message`], plus `UnknownQuickAction` for an
    /// index outside the current set.
    pub async fn select_quick_action(
        &mut self,
        index: usize,
    ) -> Result<Vec<SessionUpdate>, ClientError> {
        let span = self.span.clone();
        async {
            let envelope = self.session.select_quick_action(index)?;
            self.send_turn(envelope).await
        }
        .instrument(span)
        .await
    }

    /// Ask the backend to switch profiles
    ///
    /// The active profile only changes when the backend confirms.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Rejected` if the session is not connected, or a
    /// transport error.
    pub async fn request_profile_change(&mut self, profile: Profile) -> Result<(), ClientError> {
        let span = self.span.clone();
        async {
            let envelope = self.session.request_profile_change(profile)?;
            tracing::debug!(profile = %profile, "Requesting profile change");
            self.dispatch(envelope).await
        }
        .instrument(span)
        .await
    }

    /// Wait for the next inbound event and apply it
    ///
    /// Returns `None` once the session is closed. A frame that is ignored
    /// yields an empty update list.
    pub async fn next_update(&mut self) -> Option<Vec<SessionUpdate>> {
        if self.session.link_state() == LinkState::Closed {
            return None;
        }

        let span = self.span.clone();
        async {
            let updates = match self.transport.recv().await {
                Ok(TransportEvent::Frame(text)) => self.session.apply(decode(&text)),
                Ok(TransportEvent::Closed { reason }) => self.session.connection_closed(reason),
                Ok(TransportEvent::Error(error)) => {
                    tracing::warn!(error = %error, "Chat connection failed");
                    self.session.connection_closed(Some(error))
                }
                Err(e) => self.session.connection_closed(Some(e.to_string())),
            };
            Some(updates)
        }
        .instrument(span)
        .await
    }

    /// Close the connection
    ///
    /// # Errors
    ///
    /// Returns the transport error if the disconnect failed; the session is
    /// closed either way.
    pub async fn close(&mut self) -> Result<Vec<SessionUpdate>, ClientError> {
        let span = self.span.clone();
        async {
            let result = self.transport.disconnect().await;
            let updates = self.session.connection_closed(None);
            result?;
            Ok(updates)
        }
        .instrument(span)
        .await
    }

    /// Send the envelope of a freshly opened turn
    async fn send_turn(&mut self, envelope: ClientEnvelope) -> Result<Vec<SessionUpdate>, ClientError> {
        let index = self.session.timeline().len().saturating_sub(1);
        self.dispatch(envelope).await?;
        Ok(vec![
            SessionUpdate::TimelineAppended { index },
            SessionUpdate::ActivityChanged,
        ])
    }

    /// Send an envelope; a failed send closes the session
    async fn dispatch(&mut self, envelope: ClientEnvelope) -> Result<(), ClientError> {
        let kind = envelope.kind();
        if let Err(e) = self.transport.send(&envelope).await {
            tracing::warn!(kind, error = %e, "Failed to send envelope");
            self.session.connection_closed(Some(e.to_string()));
            return Err(e.into());
        }
        tracing::debug!(kind, "Envelope sent");
        Ok(())
    }
}
