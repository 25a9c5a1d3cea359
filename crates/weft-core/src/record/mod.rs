//! Persistable record types.
//!
//! # Module Structure
//!
//! - `config`: credential + model selector (`ConfigRecord`)
//! - `bot`: named bot with rules (`BotDefinition`)
//! - `chat`: conversation state (`ChatSession`, `ChatTurn`)
//! - `message`: history entries (`Message`, `MessageRole`)
//! - `stored`: the archive's polymorphic value (`StoredObject`)

mod bot;
mod chat;
mod config;
mod message;
mod stored;

pub use bot::{BotDefinition, DEFAULT_BOT_NAME, DEFAULT_RULES};
pub use chat::{
    ChatSession, ChatTurn, DEFAULT_PARTICIPANT, DEFAULT_REPLIES_LIMIT, DEFAULT_TITLE,
};
pub use config::{ConfigRecord, DEFAULT_MODEL};
pub use message::{Message, MessageRole};
pub use stored::{OrderingKey, StoredObject};
