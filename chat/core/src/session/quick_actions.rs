//! Quick-Action Controller
//!
//! Holds the server-suggested follow-up prompts and the session-global
//! loading flag. Every update replaces the set wholesale; there is no merge.

use crate::messages::QuickAction;

/// Prompts offered before the backend has suggested anything
#[must_use]
pub fn default_quick_actions() -> Vec<QuickAction> {
    vec![
        QuickAction::new(
            "Report Summary",
            "Explain the results of the report and extract/highlight interesting information, based on my user profile.",
        ),
        QuickAction::new(
            "Dataset",
            "Explain the dataset that was used. Highlight not used columns from the dataset.",
        ),
    ]
}

/// Current suggestion set and loading flag
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuickActionController {
    actions: Vec<QuickAction>,
    loading: bool,
}

impl QuickActionController {
    /// Start with the given set, not loading
    #[must_use]
    pub fn new(actions: Vec<QuickAction>) -> Self {
        Self {
            actions,
            loading: false,
        }
    }

    /// Start with [`default_quick_actions`]
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(default_quick_actions())
    }

    /// The current suggestion set
    #[must_use]
    pub fn actions(&self) -> &[QuickAction] {
        &self.actions
    }

    /// Whether suggestions are being recomputed
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Prompt text of the action at `index`
    #[must_use]
    pub fn prompt(&self, index: usize) -> Option<&str> {
        self.actions.get(index).map(|a| a.prompt.as_str())
    }

    /// Apply a `quick_actions` frame
    ///
    /// `loading: true` clears the set and raises the flag. Anything else
    /// replaces the set (empty when no actions were sent) and lowers it.
    pub(crate) fn apply(&mut self, loading: bool, actions: Option<Vec<QuickAction>>) {
        if loading {
            self.actions.clear();
            self.loading = true;
        } else {
            self.actions = actions.unwrap_or_default();
            self.loading = false;
        }
    }
}
