//! Chat Session State Machine
//!
//! One [`ChatSession`] exists per chat screen. It owns the timeline, the
//! transient assistant activity, the quick-action set and the profile, and
//! it is the only thing that mutates them. It performs no I/O: user actions
//! return the [`ClientEnvelope`] to send, and server events are applied with
//! [`ChatSession::apply`]. Whoever drives the session does the networking.
//!
//! # Turn lifecycle
//!
//! ```text
//!   Idle ──send_message──▶ Thinking ──message{finished:false}──▶ Streaming
//!    ▲                         │                                    │
//!    └──────────── message{finished:true}: commit to timeline ◀─────┘
//! ```
//!
//! While a turn is in flight every further send is rejected. The user's own
//! message is appended before the envelope is handed back, so the timeline
//! reflects intent immediately and is never rolled back.

mod activity;
mod gate;
mod profile_controller;
mod quick_actions;
mod timeline;

pub use activity::{tool_call_label, Activity, StreamingBuffer};
pub use gate::InitGate;
pub use profile_controller::ProfileController;
pub use quick_actions::{default_quick_actions, QuickActionController};
pub use timeline::{Author, ChatEntry, ChatMessage, SystemEvent, Timeline};

use crate::events::ClientEnvelope;
use crate::messages::{ChatId, ServerEvent, SessionId};
use crate::profile::Profile;

/// Connection state as seen by the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    /// Waiting for the transport to open
    Connecting,
    /// Transport is open
    Open,
    /// Transport closed or failed; the session is inert
    Closed,
}

/// Why a user action was not carried out
///
/// These are silent at the UI level; nothing is shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SendRejected {
    /// An assistant turn is still in flight
    #[error("An assistant reply is still in progress")]
    TurnInProgress,
    /// The message was empty or whitespace
    #[error("Message is empty")]
    EmptyMessage,
    /// The connection is not open
    #[error("Session is not connected")]
    NotConnected,
    /// No quick action at that position
    #[error("No quick action at index {0}")]
    UnknownQuickAction(usize),
    /// The session already opened its one connection
    #[error("Session connection was already opened")]
    AlreadyOpened,
}

/// What changed as the result of a transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionUpdate {
    /// An entry was appended at this index
    TimelineAppended {
        /// Index of the new entry
        index: usize,
    },
    /// Streaming text or tool-call indicator changed
    ActivityChanged,
    /// Suggestion set or loading flag changed
    QuickActionsChanged,
    /// The active profile changed
    ProfileChanged(Profile),
    /// The connection state changed
    LinkChanged(LinkState),
}

/// Per-screen chat session
#[derive(Clone, Debug)]
pub struct ChatSession {
    id: SessionId,
    chat_id: ChatId,
    timeline: Timeline,
    streaming: StreamingBuffer,
    tool_call: Option<String>,
    quick_actions: QuickActionController,
    profile: ProfileController,
    gate: InitGate,
    link: LinkState,
    close_reason: Option<String>,
}

impl ChatSession {
    /// Create a session and seed the welcome message
    ///
    /// `report_label` is the human name of the report, resolved from the
    /// report list by the caller. The welcome message is local only.
    pub fn new(chat_id: ChatId, profile: Profile, report_label: Option<&str>) -> Self {
        let mut timeline = Timeline::new();
        timeline.push(ChatEntry::Message(ChatMessage::system(welcome_message(
            report_label,
        ))));

        Self {
            id: SessionId::new(),
            chat_id,
            timeline,
            streaming: StreamingBuffer::default(),
            tool_call: None,
            quick_actions: QuickActionController::with_defaults(),
            profile: ProfileController::new(profile),
            gate: InitGate::new(),
            link: LinkState::Connecting,
            close_reason: None,
        }
    }

    // ============================================
    // Read Access
    // ============================================

    /// Session instance id
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Report this session is about
    #[must_use]
    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    /// The conversation so far
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The in-flight assistant reply
    #[must_use]
    pub fn streaming(&self) -> &StreamingBuffer {
        &self.streaming
    }

    /// Name of the capability being invoked, if any
    #[must_use]
    pub fn tool_call(&self) -> Option<&str> {
        self.tool_call.as_deref()
    }

    /// What to show for the assistant right now
    #[must_use]
    pub fn activity(&self) -> Activity<'_> {
        Activity::resolve(&self.streaming, self.tool_call.as_deref())
    }

    /// Suggested follow-up prompts
    #[must_use]
    pub fn quick_actions(&self) -> &QuickActionController {
        &self.quick_actions
    }

    /// Profile state
    #[must_use]
    pub fn profile(&self) -> &ProfileController {
        &self.profile
    }

    /// Connection state
    #[must_use]
    pub fn link_state(&self) -> LinkState {
        self.link
    }

    /// Why the connection closed, if it did and a reason was given
    #[must_use]
    pub fn close_reason(&self) -> Option<&str> {
        self.close_reason.as_deref()
    }

    /// Whether `initChat` has gone out
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.gate.is_released()
    }

    /// Whether a user message would be accepted right now
    #[must_use]
    pub fn can_send(&self) -> bool {
        self.link == LinkState::Open && self.streaming.is_empty()
    }

    // ============================================
    // Lifecycle
    // ============================================

    /// The transport reached the open state
    ///
    /// Returns `initChat` if this released the init gate.
    pub fn connection_opened(&mut self) -> Option<ClientEnvelope> {
        if self.link == LinkState::Closed {
            return None;
        }
        self.link = LinkState::Open;
        self.gate.connection_opened().then(|| self.init_envelope())
    }

    /// The report list finished loading
    ///
    /// Returns `initChat` if this released the init gate.
    pub fn reports_loaded(&mut self) -> Option<ClientEnvelope> {
        if self.link == LinkState::Closed {
            return None;
        }
        self.gate.reports_loaded().then(|| self.init_envelope())
    }

    /// The transport closed or failed; the session becomes inert
    pub fn connection_closed(&mut self, reason: Option<String>) -> Vec<SessionUpdate> {
        if self.link == LinkState::Closed {
            return Vec::new();
        }
        tracing::info!(
            session_id = %self.id,
            reason = reason.as_deref().unwrap_or("none"),
            "Chat session closed"
        );
        self.link = LinkState::Closed;
        self.close_reason = reason;
        vec![SessionUpdate::LinkChanged(LinkState::Closed)]
    }

    fn init_envelope(&self) -> ClientEnvelope {
        ClientEnvelope::InitChat {
            chat_id: self.chat_id.clone(),
            profile: self.profile.active(),
        }
    }

    // ============================================
    // User Actions
    // ============================================

    /// Send a user message
    ///
    /// On success the message is already in the timeline and a turn is open;
    /// the caller must send the returned envelope.
    pub fn send_message(&mut self, content: &str) -> Result<ClientEnvelope, SendRejected> {
        if self.link != LinkState::Open {
            return Err(SendRejected::NotConnected);
        }
        if !self.streaming.is_empty() {
            return Err(SendRejected::TurnInProgress);
        }
        if content.trim().is_empty() {
            return Err(SendRejected::EmptyMessage);
        }

        self.timeline
            .push(ChatEntry::Message(ChatMessage::user(content)));
        self.streaming.open();

        Ok(ClientEnvelope::Message {
            content: content.to_string(),
            profile: self.profile.active(),
        })
    }

    /// Send the prompt of the quick action at `index`
    pub fn select_quick_action(&mut self, index: usize) -> Result<ClientEnvelope, SendRejected> {
        let prompt = self
            .quick_actions
            .prompt(index)
            .ok_or(SendRejected::UnknownQuickAction(index))?
            .to_string();
        self.send_message(&prompt)
    }

    /// Ask the backend to switch profiles
    ///
    /// The active profile does not change until the backend confirms.
    pub fn request_profile_change(
        &mut self,
        profile: Profile,
    ) -> Result<ClientEnvelope, SendRejected> {
        if self.link != LinkState::Open {
            return Err(SendRejected::NotConnected);
        }
        Ok(self.profile.request_change(profile))
    }

    // ============================================
    // Server Events
    // ============================================

    /// Apply one decoded server event
    pub fn apply(&mut self, event: ServerEvent) -> Vec<SessionUpdate> {
        match event {
            ServerEvent::Message { content, finished } => self.apply_message(content, finished),
            ServerEvent::ToolCall { name, .. } => {
                self.tool_call = Some(name);
                vec![SessionUpdate::ActivityChanged]
            }
            ServerEvent::QuickActions { loading, actions } => {
                self.quick_actions.apply(loading, actions);
                vec![SessionUpdate::QuickActionsChanged]
            }
            ServerEvent::ProfileUpdated { profile } => {
                let event = self.profile.confirm(profile);
                let index = self.timeline.push(ChatEntry::Event(event));
                vec![
                    SessionUpdate::ProfileChanged(profile),
                    SessionUpdate::TimelineAppended { index },
                ]
            }
            ServerEvent::Ignored(reason) => {
                tracing::debug!(session_id = %self.id, %reason, "Ignored inbound frame");
                Vec::new()
            }
        }
    }

    fn apply_message(&mut self, content: Option<String>, finished: bool) -> Vec<SessionUpdate> {
        // Any message activity supersedes the tool-call display.
        self.tool_call = None;

        if !finished {
            match content {
                Some(text) => self.streaming.update(text),
                None => self.streaming.open(),
            }
            return vec![SessionUpdate::ActivityChanged];
        }

        let buffered = self.streaming.take();
        let committed = content
            .filter(|text| !text.is_empty())
            .or(buffered)
            .filter(|text| !text.is_empty());

        let mut updates = Vec::with_capacity(2);
        if let Some(text) = committed {
            let index = self
                .timeline
                .push(ChatEntry::Message(ChatMessage::system(text)));
            updates.push(SessionUpdate::TimelineAppended { index });
        } else {
            tracing::debug!(session_id = %self.id, "Assistant turn finished without content");
        }
        updates.push(SessionUpdate::ActivityChanged);
        updates
    }
}

/// The locally seeded first message of every session
#[must_use]
pub fn welcome_message(report_label: Option<&str>) -> String {
    match report_label {
        Some(label) => format!(
            "Welcome to the interactive report chat! Do you want to learn more about the <strong>{label}</strong> report?"
        ),
        None => {
            "Welcome to the interactive report chat! Do you want to learn more about this report?"
                .to_string()
        }
    }
}
