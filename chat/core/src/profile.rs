//! Interpretation Profiles
//!
//! The profile tells the backend which audience its explanations are written
//! for. It has no effect on client-side logic beyond being echoed in outbound
//! envelopes and shown to the user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Audience profile for assistant responses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Plain language, no jargon
    #[default]
    NonTechnical,
    /// Technical vocabulary is fine
    Technical,
    /// Framed around business decisions
    Business,
    /// Detailed answers for subject-matter experts
    Expert,
}

impl Profile {
    /// All profiles in presentation order
    pub const ALL: [Profile; 4] = [
        Profile::NonTechnical,
        Profile::Technical,
        Profile::Business,
        Profile::Expert,
    ];

    /// Name used on the wire
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::NonTechnical => "non_technical",
            Self::Technical => "technical",
            Self::Business => "business",
            Self::Expert => "expert",
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NonTechnical => "Non Technical",
            Self::Technical => "Technical",
            Self::Business => "Business",
            Self::Expert => "Expert",
        }
    }

    /// One-line description shown next to the label
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::NonTechnical => {
                "Answers are given in a non-technical manner, without technical jargon."
            }
            Self::Technical => "Answers are given in a technical manner, with technical jargon.",
            Self::Business => "Answers are explained in a business context.",
            Self::Expert => "Answers are given in a detailed and expert manner.",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Returned when a string names no known profile
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unknown profile: {0} (expected one of non_technical, technical, business, expert)")]
pub struct UnknownProfile(pub String);

impl FromStr for Profile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|p| p.wire_name() == normalized)
            .ok_or_else(|| UnknownProfile(s.to_string()))
    }
}
