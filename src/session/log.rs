//! Append-only conversation log for solution synthesis.

use serde::{Deserialize, Serialize};

use crate::llm::Message;

/// Append-only record of the solution-generation conversation.
///
/// The solution synthesizer reads the full history to regenerate with
/// context; the merge appends new exchanges at the end. Nothing ever
/// rewrites, reorders, or truncates past entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    entries: Vec<Message>,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the logged messages, oldest first.
    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    /// Number of logged messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been logged yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the logged messages, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.entries.iter()
    }

    /// The single mutation: push one message at the end.
    pub(crate) fn append(&mut self, message: Message) {
        self.entries.push(message);
    }
}
