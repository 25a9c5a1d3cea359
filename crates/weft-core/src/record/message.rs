//! Conversation message types.
//!
//! A [`Message`] is one turn of a chat session's history. Messages are owned
//! by exactly one session and are never edited once recorded.

use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Message from the participant.
    User,
    /// Message from the bot.
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Name of the participant or bot that produced the message.
    pub owner: String,
    /// Tokens billed for this message.
    pub tokens: u32,
    /// Timestamp when the message was created.
    pub timestamp: String,
    /// Attached image references (URLs or data URIs).
    #[serde(default)]
    pub images: Vec<String>,
    /// Attached file references (provider file ids).
    #[serde(default)]
    pub files: Vec<String>,
}

impl Message {
    pub fn new(
        role: MessageRole,
        content: impl Into<String>,
        owner: impl Into<String>,
        tokens: u32,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            role,
            content: content.into(),
            owner: owner.into(),
            tokens,
            timestamp: timestamp.into(),
            images: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Returns a copy of this message carrying the given attachments.
    pub fn with_attachments(mut self, images: Vec<String>, files: Vec<String>) -> Self {
        self.images = images;
        self.files = files;
        self
    }
}
