//! Conversation Timeline
//!
//! The ordered, append-only log of everything said in a chat session.
//! Insertion order is display order. Entries are never edited, reordered or
//! removed once appended; the only mutator is crate-private.

use serde::Serialize;

/// Who wrote a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    /// The person using the client
    User,
    /// The assistant (or the client speaking on its behalf)
    System,
}

/// A message in the conversation
///
/// `content` may carry HTML and is rendered verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Who wrote it
    pub author: Author,
    /// Message body
    pub content: String,
}

impl ChatMessage {
    /// A message from the user
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            content: content.into(),
        }
    }

    /// A message from the assistant
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            author: Author::System,
            content: content.into(),
        }
    }
}

/// A narration line not attributable to either party
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SystemEvent {
    /// Text shown to the user
    pub text: String,
}

impl SystemEvent {
    /// Create a narration line
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One entry in the timeline
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEntry {
    /// A message from the user or the assistant
    Message(ChatMessage),
    /// A narration line
    Event(SystemEvent),
}

impl ChatEntry {
    /// The message, if this entry is one
    #[must_use]
    pub fn as_message(&self) -> Option<&ChatMessage> {
        match self {
            Self::Message(message) => Some(message),
            Self::Event(_) => None,
        }
    }

    /// The narration, if this entry is one
    #[must_use]
    pub fn as_event(&self) -> Option<&SystemEvent> {
        match self {
            Self::Event(event) => Some(event),
            Self::Message(_) => None,
        }
    }
}

/// Append-only sequence of chat entries
#[derive(Clone, Debug, Default, Serialize)]
pub struct Timeline {
    entries: Vec<ChatEntry>,
}

impl Timeline {
    /// Create an empty timeline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, returning its index
    pub(crate) fn push(&mut self, entry: ChatEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// All entries in display order
    #[must_use]
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Entries appended at or after `index`
    #[must_use]
    pub fn since(&self, index: usize) -> &[ChatEntry] {
        self.entries.get(index..).unwrap_or(&[])
    }

    /// Entry at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ChatEntry> {
        self.entries.get(index)
    }

    /// Most recent entry
    #[must_use]
    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been said yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in display order
    pub fn iter(&self) -> std::slice::Iter<'_, ChatEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a ChatEntry;
    type IntoIter = std::slice::Iter<'a, ChatEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
