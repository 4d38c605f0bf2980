//! Line-Oriented Rendering
//!
//! Turns session updates into lines for stdout. The terminal cannot redraw a
//! streaming reply in place, so partial text is not echoed; the activity
//! line announces each phase and the committed reply is printed whole.

use chat_core::session::QuickActionController;
use chat_core::{Activity, Author, ChatEntry, ChatSession, LinkState, Profile, SessionUpdate};

/// Phase of the assistant, without the text
#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Thinking,
    ToolCall(String),
    Streaming,
}

impl From<Activity<'_>> for Phase {
    fn from(activity: Activity<'_>) -> Self {
        match activity {
            Activity::Idle => Self::Idle,
            Activity::Thinking => Self::Thinking,
            Activity::ToolCall(name) => Self::ToolCall(name.to_string()),
            Activity::Streaming(_) => Self::Streaming,
        }
    }
}

/// Tracks what has already been printed
#[derive(Debug, Default)]
pub struct Renderer {
    /// Timeline entries already printed
    shown: usize,
    /// Last announced phase
    phase: Phase,
}

impl Renderer {
    /// Create a renderer that has printed nothing yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines for entries not yet printed
    pub fn catch_up(&mut self, session: &ChatSession) -> Vec<String> {
        let lines = session
            .timeline()
            .since(self.shown)
            .iter()
            .map(format_entry)
            .collect();
        self.shown = session.timeline().len();
        lines
    }

    /// Lines for one batch of updates
    pub fn render(&mut self, session: &ChatSession, updates: &[SessionUpdate]) -> Vec<String> {
        let mut lines = Vec::new();

        for update in updates {
            match update {
                SessionUpdate::TimelineAppended { .. } | SessionUpdate::ProfileChanged(_) => {
                    lines.extend(self.catch_up(session));
                }
                SessionUpdate::ActivityChanged => {
                    let phase = Phase::from(session.activity());
                    if phase != self.phase {
                        if let Some(line) = format_activity(session.activity()) {
                            lines.push(line);
                        }
                        self.phase = phase;
                    }
                }
                SessionUpdate::QuickActionsChanged => {
                    if !session.quick_actions().is_loading() {
                        lines.extend(format_quick_actions(session.quick_actions()));
                    }
                }
                SessionUpdate::LinkChanged(LinkState::Closed) => {
                    lines.push(match session.close_reason() {
                        Some(reason) => format!("-- connection closed: {reason}"),
                        None => "-- connection closed".to_string(),
                    });
                }
                SessionUpdate::LinkChanged(_) => {}
            }
        }

        lines
    }
}

/// One timeline entry as a line
pub fn format_entry(entry: &ChatEntry) -> String {
    match entry {
        ChatEntry::Message(message) => {
            let who = match message.author {
                Author::User => "you",
                Author::System => "assistant",
            };
            format!("{who}> {}", plain_text(&message.content))
        }
        ChatEntry::Event(event) => format!("-- {}", event.text),
    }
}

/// Status line for the assistant's activity
pub fn format_activity(activity: Activity<'_>) -> Option<String> {
    match activity {
        Activity::Idle => None,
        Activity::Thinking => Some("... thinking".to_string()),
        Activity::ToolCall(name) => Some(format!("... {}", chat_core::tool_call_label(name))),
        Activity::Streaming(_) => Some("... typing".to_string()),
    }
}

/// Numbered suggestion list (one-based, matching `/quick <n>`)
pub fn format_quick_actions(actions: &QuickActionController) -> Vec<String> {
    if actions.actions().is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Suggestions:".to_string()];
    lines.extend(
        actions
            .actions()
            .iter()
            .enumerate()
            .map(|(i, action)| format!("  {}. {}", i + 1, action.label)),
    );
    lines
}

/// Profile list with the active one marked
pub fn format_profiles(active: Profile) -> Vec<String> {
    Profile::ALL
        .iter()
        .map(|profile| {
            let marker = if *profile == active { '*' } else { ' ' };
            format!(
                "{marker} {:<14} {} - {}",
                profile.wire_name(),
                profile.label(),
                profile.description()
            )
        })
        .collect()
}

/// Message content for a plain terminal
///
/// Backend text may carry inline HTML emphasis; it is shown as markdown
/// bold and line breaks.
fn plain_text(content: &str) -> String {
    content
        .replace("<strong>", "**")
        .replace("</strong>", "**")
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
}
