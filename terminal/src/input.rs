//! Chat Input Parsing
//!
//! Plain lines are messages. Lines starting with `/` are local commands.

use chat_core::Profile;

/// One line typed by the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Send as a chat message
    Message(String),
    /// Request a profile change
    Profile(Profile),
    /// List the available profiles
    ListProfiles,
    /// Send a quick action (zero-based index)
    Quick(usize),
    /// Show the current quick actions
    Actions,
    /// Show command help
    Help,
    /// Leave the chat
    Quit,
    /// Blank line
    Empty,
    /// A command that could not be understood
    Invalid(String),
}

/// Help text for the in-chat commands
pub const HELP: &str = "\
Commands:
  /profile <name>  switch explanation profile (non_technical, technical, business, expert)
  /profile         list profiles
  /quick <n>       send suggestion number n
  /actions         show suggestions
  /help            show this help
  /quit            leave the chat
Anything else is sent as a message.";

impl Input {
    /// Parse one line of user input
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }

        let Some(command) = trimmed.strip_prefix('/') else {
            return Self::Message(trimmed.to_string());
        };

        let mut parts = command.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        match (name, arg) {
            ("quit" | "exit" | "q", _) => Self::Quit,
            ("help" | "?", _) => Self::Help,
            ("actions", _) => Self::Actions,
            ("profile", None) => Self::ListProfiles,
            ("profile", Some(value)) => match value.parse::<Profile>() {
                Ok(profile) => Self::Profile(profile),
                Err(e) => Self::Invalid(e.to_string()),
            },
            ("quick", Some(value)) => match value.parse::<usize>() {
                Ok(n) if n >= 1 => Self::Quick(n - 1),
                _ => Self::Invalid(format!("Not a suggestion number: {value}")),
            },
            ("quick", None) => Self::Invalid("Usage: /quick <n>".to_string()),
            (other, _) => Self::Invalid(format!("Unknown command: /{other} (try /help)")),
        }
    }
}
