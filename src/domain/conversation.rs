// ============================================================
// Layer 3 — Conversation Domain Type
// ============================================================
// A conversation is an ordered list of chat turns. Each turn
// has a role ("system", "user", "assistant") and free text.
//
// Every prompt this tool sends is a single user turn, but the
// type stays general because chat templates are written
// against the full `messages` list.
//
// Serialize is required: the chat template engine receives the
// turns as a `messages` value and reads `role` / `content` by
// field name.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// The role name used for the person asking the question
pub const USER_ROLE: &str = "user";

/// One turn in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who is speaking: "system", "user" or "assistant"
    pub role: String,

    /// The text of the turn
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role:    role.into(),
            content: content.into(),
        }
    }

    /// Shorthand for a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(USER_ROLE, content)
    }
}

/// An ordered sequence of chat turns.
///
/// Created once by the prompt set and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// A conversation consisting of exactly one user turn
    pub fn single_user_turn(content: impl Into<String>) -> Self {
        Self { messages: vec![ChatMessage::user(content)] }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Content of the first user turn.
    ///
    /// This is the text recorded as the `prompt` of a result.
    /// Returns an empty string if the conversation has no user turn.
    pub fn user_content(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == USER_ROLE)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

impl From<Vec<ChatMessage>> for Conversation {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}
