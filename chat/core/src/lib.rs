//! Chat Core - Session Synchronizer for the Interactive Report Chat
//!
//! A user uploads a model-evaluation artifact, then talks to an assistant
//! that explains it over a long-lived WebSocket. The backend pushes partial
//! replies, tool-call notices, follow-up suggestions and profile
//! confirmations whenever it likes; this crate turns that stream into an
//! ordered, renderable conversation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Surface (terminal, GUI, tests)                │
//! └───────────────┬──────────────────────────────▲───────────────┘
//!          user actions                   SessionUpdate
//!                 │                              │
//! ┌───────────────▼──────────────────────────────┴───────────────┐
//! │                         ChatClient                            │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │                     ChatSession                       │    │
//! │  │  Timeline │ StreamingBuffer │ QuickActions │ Profile  │    │
//! │  └───────▲──────────────────────────────┬────────────────┘    │
//! │     ServerEvent (decoder)        ClientEnvelope               │
//! └──────────┼──────────────────────────────┼────────────────────┘
//!            │                              │
//! ┌──────────┴──────────────────────────────▼────────────────────┐
//! │          ChatTransport (WebSocket, in-process)                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ChatSession`]: the per-screen state machine; pure, no I/O
//! - [`ChatClient`]: runs a session over a transport
//! - [`ServerEvent`]: decoded inbound frames
//! - [`ClientEnvelope`]: outbound frames
//! - [`ReportsClient`]: the report list, upload and export endpoints
//!
//! # Module Overview
//!
//! - [`client`]: session runner
//! - [`config`]: TOML/env/CLI configuration
//! - [`decoder`]: inbound frame decoding
//! - [`events`]: client-to-backend envelopes
//! - [`messages`]: backend-to-client events and identifiers
//! - [`profile`]: explanation profiles
//! - [`reports`]: HTTP collaborators
//! - [`session`]: the session state machine
//! - [`transport`]: connection abstraction (WebSocket, in-process)
//!
//! # No UI Dependencies
//!
//! Nothing here renders. Surfaces read [`ChatSession`] and react to
//! [`SessionUpdate`]s.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod decoder;
pub mod events;
pub mod messages;
pub mod profile;
pub mod reports;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use client::{ChatClient, ClientError};
pub use decoder::decode;
pub use events::ClientEnvelope;
pub use messages::{ChatId, IgnoreReason, QuickAction, ServerEvent, SessionId};
pub use profile::{Profile, UnknownProfile};
pub use session::{
    tool_call_label, welcome_message, Activity, Author, ChatEntry, ChatMessage, ChatSession,
    LinkState, SendRejected, SessionUpdate, SystemEvent, Timeline,
};

// Transport exports
pub use transport::{ChatTransport, InProcessTransport, TransportError, TransportEvent};
#[cfg(feature = "websocket")]
pub use transport::WebSocketTransport;

// Report endpoint exports
pub use reports::{find_report, Report, ReportsClient, ReportsError, UploadError};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ClientConfig, ClientToml,
    ConfigError, ConfigOverrides, ConfigSource,
};
