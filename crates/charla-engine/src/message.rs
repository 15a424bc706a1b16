//! Chat messages and the append-only message log.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The local user.
    Me,
    /// The other party.
    Other,
}

/// Identifier of a message, unique and increasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    sender: Sender,
    text: String,
    timestamp: String,
}

impl Message {
    /// Message identifier.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Author of the message.
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Message body (trimmed, never empty).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Display timestamp, e.g. `1:05 PM`.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Whether the local user sent this message.
    pub fn is_mine(&self) -> bool {
        self.sender == Sender::Me
    }
}

/// Ordered, append-only list of messages.
///
/// Ids are assigned as `last id + 1` (starting at 1), so they are strictly
/// increasing in list order.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Look up a message by id.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        // Ids are sorted, so a binary search is valid.
        self.messages
            .binary_search_by_key(&id, Message::id)
            .ok()
            .map(|i| &self.messages[i])
    }

    /// The id the next appended message will receive.
    pub fn next_id(&self) -> MessageId {
        MessageId(self.messages.last().map_or(1, |m| m.id.0 + 1))
    }

    /// Append a message. Returns `None` if `text` is blank after trimming.
    pub(crate) fn append(
        &mut self,
        sender: Sender,
        text: &str,
        timestamp: String,
    ) -> Option<MessageId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.next_id();
        self.messages.push(Message {
            id,
            sender,
            text: text.to_string(),
            timestamp,
        });
        Some(id)
    }
}
