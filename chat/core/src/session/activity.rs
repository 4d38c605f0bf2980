//! Transient Assistant Activity
//!
//! What the assistant is doing right now, as opposed to what has been said.
//! Two pieces of state live here: the streaming buffer for the in-flight
//! reply and the tool-call indicator. Neither is part of the timeline.

/// The at-most-one in-flight assistant reply
///
/// A pending turn counts as non-empty from the moment the user's message is
/// sent, before any chunk arrives. That is what keeps the send path closed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamingBuffer {
    pending: Option<String>,
}

impl StreamingBuffer {
    /// Whether no turn is in flight
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// Text received so far, if a turn is in flight
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Open a turn with no text yet (no-op if one is already open)
    pub(crate) fn open(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(String::new());
        }
    }

    /// Replace the buffered text with the latest accumulated content
    pub(crate) fn update(&mut self, content: String) {
        self.pending = Some(content);
    }

    /// Close the turn, returning whatever text was buffered
    pub(crate) fn take(&mut self) -> Option<String> {
        self.pending.take()
    }
}

/// What presentation should show for the assistant right now
///
/// A tool call takes precedence over streamed text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity<'a> {
    /// Nothing in flight
    Idle,
    /// A turn is open but no text has arrived
    Thinking,
    /// The assistant is invoking a named capability
    ToolCall(&'a str),
    /// Partial reply text
    Streaming(&'a str),
}

impl Activity<'_> {
    /// Derive the view from the buffer and the tool-call indicator
    #[must_use]
    pub fn resolve<'a>(buffer: &'a StreamingBuffer, tool_call: Option<&'a str>) -> Activity<'a> {
        if let Some(name) = tool_call {
            return Activity::ToolCall(name);
        }
        match buffer.text() {
            None => Activity::Idle,
            Some("") => Activity::Thinking,
            Some(text) => Activity::Streaming(text),
        }
    }

    /// Whether anything is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !matches!(self, Activity::Idle)
    }
}

/// Display text for a tool-call indicator
#[must_use]
pub fn tool_call_label(name: &str) -> String {
    format!("Calling method: {name}")
}
