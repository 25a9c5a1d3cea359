//! The polymorphic value held by an archive entry.

use super::bot::BotDefinition;
use super::chat::ChatSession;
use super::config::ConfigRecord;
use chrono::{DateTime, Utc};
use std::fmt;

/// Sort key used when writing an archive: undated records first, then chat
/// sessions by creation time, with the entry id breaking ties.
pub type OrderingKey = (Option<DateTime<Utc>>, u64);

/// One of the three persistable kinds.
///
/// Equality is structural, including the nested configuration record of a bot
/// and the nested bot of a chat session.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredObject {
    Config(ConfigRecord),
    Bot(BotDefinition),
    Chat(ChatSession),
}

impl StoredObject {
    pub fn kind(&self) -> &'static str {
        match self {
            StoredObject::Config(_) => "config",
            StoredObject::Bot(_) => "bot",
            StoredObject::Chat(_) => "chat",
        }
    }

    /// The configuration record every variant is ultimately built on.
    pub fn config(&self) -> &ConfigRecord {
        match self {
            StoredObject::Config(config) => config,
            StoredObject::Bot(bot) => &bot.config,
            StoredObject::Chat(chat) => &chat.bot.config,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            StoredObject::Chat(chat) => Some(chat.created_at),
            _ => None,
        }
    }

    pub fn ordering_key(&self, id: u64) -> OrderingKey {
        (self.created_at(), id)
    }
}

impl From<ConfigRecord> for StoredObject {
    fn from(value: ConfigRecord) -> Self {
        StoredObject::Config(value)
    }
}

impl From<BotDefinition> for StoredObject {
    fn from(value: BotDefinition) -> Self {
        StoredObject::Bot(value)
    }
}

impl From<ChatSession> for StoredObject {
    fn from(value: ChatSession) -> Self {
        StoredObject::Chat(value)
    }
}

impl fmt::Display for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredObject::Config(config) => fmt::Display::fmt(config, f),
            StoredObject::Bot(bot) => fmt::Display::fmt(bot, f),
            StoredObject::Chat(chat) => fmt::Display::fmt(chat, f),
        }
    }
}
