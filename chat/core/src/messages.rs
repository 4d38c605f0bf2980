//! Server Events
//!
//! Typed events pushed from the report chat backend to the client. These are
//! the only inputs the session state machine accepts from the network; raw
//! frames are turned into them by [`crate::decoder`].
//!
//! # Design Philosophy
//!
//! The wire protocol is a loosely typed JSON object with a `type`
//! discriminator. On this side of the decode boundary everything is a closed
//! enum, so the state machine matches exhaustively and never probes for
//! optional properties. Frames that cannot be understood become an explicit
//! [`ServerEvent::Ignored`] rather than disappearing silently.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::profile::Profile;

/// Events from the backend to the session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    // ============================================
    // Assistant Output
    // ============================================
    /// A chunk of the assistant's reply
    ///
    /// `content` is the full text accumulated so far, not a delta.
    Message {
        /// Accumulated reply text (absent on an empty final frame)
        content: Option<String>,
        /// Whether this is the last frame of the turn
        finished: bool,
    },

    /// The assistant is invoking a named backend capability
    ToolCall {
        /// Capability name
        name: String,
        /// Serialized arguments, if the backend sent them
        args: Option<String>,
    },

    // ============================================
    // Suggestions
    // ============================================
    /// Suggested follow-up prompts are being recomputed or have arrived
    QuickActions {
        /// Whether the backend is still computing suggestions
        loading: bool,
        /// The new suggestion set (replaces the old one wholesale)
        actions: Option<Vec<QuickAction>>,
    },

    // ============================================
    // Profile
    // ============================================
    /// The backend confirmed a profile change
    ProfileUpdated {
        /// The profile now in effect
        profile: Profile,
    },

    // ============================================
    // Decode Fallout
    // ============================================
    /// A frame that carried nothing the session can use
    Ignored(IgnoreReason),
}

impl ServerEvent {
    /// Short name of the event kind, for logging
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::ToolCall { .. } => "tool_call",
            Self::QuickActions { .. } => "quick_actions",
            Self::ProfileUpdated { .. } => "user_profile_updated",
            Self::Ignored(_) => "ignored",
        }
    }
}

/// Why a frame was dropped at the decode boundary
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not JSON, not an object, or a known kind with unusable fields
    Malformed,
    /// No string `type` discriminator
    MissingKind,
    /// A discriminator this client does not know
    UnknownKind(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed frame"),
            Self::MissingKind => write!(f, "missing type discriminator"),
            Self::UnknownKind(kind) => write!(f, "unknown frame type: {kind}"),
        }
    }
}

/// A server-suggested follow-up prompt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickAction {
    /// Short button label
    pub label: String,
    /// Prompt text sent when the action is selected
    pub prompt: String,
}

impl QuickAction {
    /// Create a quick action
    pub fn new(label: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prompt: prompt.into(),
        }
    }
}

// ============================================
// Identifiers
// ============================================

/// Identifier of a report and of the chat session opened on it
///
/// Opaque to the client. The backend uses numeric ids, so ids made only of
/// ASCII digits go over the wire as JSON numbers and everything else as a
/// string. Both forms are accepted when reading.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub String);

impl ChatId {
    /// Create a chat id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ChatId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ChatId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for ChatId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let canonical = self.0.bytes().all(|b| b.is_ascii_digit())
            && (self.0.len() == 1 || !self.0.starts_with('0'));
        match self.0.parse::<u64>() {
            Ok(n) if canonical => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for ChatId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Identifier of one in-memory session instance (for tracing only)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Generate a new random session id
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session_{}", self.0.simple())
    }
}
