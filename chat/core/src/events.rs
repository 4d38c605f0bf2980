//! Client Envelopes
//!
//! Frames sent from the client to the report chat backend. There are only
//! three: the one-time session initialisation, a user utterance, and a
//! profile-change request. Every envelope carries the profile because the
//! backend is stateless about it between requests.

use serde::{Deserialize, Serialize};

use crate::messages::ChatId;
use crate::profile::Profile;

/// Envelopes from client to backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEnvelope {
    /// Bind the connection to a report (sent exactly once per session)
    #[serde(rename = "initChat")]
    InitChat {
        /// Report the conversation is about
        #[serde(rename = "chatId")]
        chat_id: ChatId,
        /// Profile in effect when the session started
        #[serde(rename = "user_profile")]
        profile: Profile,
    },

    /// A user utterance
    #[serde(rename = "message")]
    Message {
        /// The text the user sent
        #[serde(rename = "message")]
        content: String,
        /// Profile in effect for this turn
        #[serde(rename = "user_profile")]
        profile: Profile,
    },

    /// Ask the backend to switch profiles
    #[serde(rename = "update_user_profile")]
    UpdateUserProfile {
        /// Requested profile
        #[serde(rename = "user_profile")]
        profile: Profile,
    },
}

impl ClientEnvelope {
    /// Short name of the envelope kind, for logging
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitChat { .. } => "initChat",
            Self::Message { .. } => "message",
            Self::UpdateUserProfile { .. } => "update_user_profile",
        }
    }

    /// Encode as a UTF-8 JSON text frame
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
