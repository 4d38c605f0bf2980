//! Profile Controller
//!
//! Tracks the active interpretation profile. Unlike user messages, profile
//! changes are never applied optimistically: the active value only moves when
//! the backend confirms it.

use crate::events::ClientEnvelope;
use crate::profile::Profile;

use super::timeline::SystemEvent;

/// Active profile plus the most recent unconfirmed request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileController {
    active: Profile,
    requested: Option<Profile>,
}

impl ProfileController {
    /// Start with `initial` active and nothing requested
    #[must_use]
    pub fn new(initial: Profile) -> Self {
        Self {
            active: initial,
            requested: None,
        }
    }

    /// The server-confirmed profile
    #[must_use]
    pub fn active(&self) -> Profile {
        self.active
    }

    /// The last requested profile still awaiting confirmation
    #[must_use]
    pub fn requested(&self) -> Option<Profile> {
        self.requested
    }

    /// Record a change request and build its envelope
    ///
    /// The active profile is left untouched.
    pub fn request_change(&mut self, profile: Profile) -> ClientEnvelope {
        self.requested = Some(profile);
        ClientEnvelope::UpdateUserProfile { profile }
    }

    /// Apply the backend's confirmation, returning the narration to append
    pub fn confirm(&mut self, profile: Profile) -> SystemEvent {
        self.active = profile;
        self.requested = None;
        SystemEvent::new(format!("Profile changed to {}", profile.wire_name()))
    }
}

impl Default for ProfileController {
    fn default() -> Self {
        Self::new(Profile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_does_not_change_active() {
        let mut controller = ProfileController::new(Profile::NonTechnical);

        let envelope = controller.request_change(Profile::Expert);

        assert_eq!(
            envelope,
            ClientEnvelope::UpdateUserProfile {
                profile: Profile::Expert
            }
        );
        assert_eq!(controller.active(), Profile::NonTechnical);
        assert_eq!(controller.requested(), Some(Profile::Expert));
    }

    #[test]
    fn test_confirm_sets_active_and_narrates() {
        let mut controller = ProfileController::default();
        controller.request_change(Profile::Business);

        let event = controller.confirm(Profile::Business);

        assert_eq!(controller.active(), Profile::Business);
        assert_eq!(controller.requested(), None);
        assert_eq!(event.text, "Profile changed to business");
    }

    #[test]
    fn test_unsolicited_confirmation_still_applies() {
        let mut controller = ProfileController::default();
        let event = controller.confirm(Profile::Technical);
        assert_eq!(controller.active(), Profile::Technical);
        assert!(event.text.contains("technical"));
    }
}
