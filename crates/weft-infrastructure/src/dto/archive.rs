//! Entry DTOs and conversions to and from the domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use weft_core::record::{
    BotDefinition, ChatSession, ConfigRecord, DEFAULT_BOT_NAME, DEFAULT_MODEL,
    DEFAULT_PARTICIPANT, DEFAULT_REPLIES_LIMIT, DEFAULT_RULES, DEFAULT_TITLE, Message,
    StoredObject,
};
use weft_core::ResponseSchema;

/// Current schema version written into the archive envelope.
pub const ARCHIVE_SCHEMA_VERSION: &str = "1.0.0";

/// Values of the `kind` tag the codec can construct.
pub const KNOWN_KINDS: &[&str] = &["config", "bot", "chat"];

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}

fn default_rules() -> String {
    DEFAULT_RULES.to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_participant() -> String {
    DEFAULT_PARTICIPANT.to_string()
}

fn default_replies_limit() -> Option<u32> {
    Some(DEFAULT_REPLIES_LIMIT)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecordDto {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotDefinitionDto {
    pub config: ConfigRecordDto,
    #[serde(default = "default_bot_name")]
    pub name: String,
    #[serde(default = "default_rules")]
    pub rules: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<ResponseSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSessionDto {
    pub bot: BotDefinitionDto,
    #[serde(default = "default_title")]
    pub title: String,
    /// `null` means unbounded; a missing field means the default ceiling.
    #[serde(default = "default_replies_limit")]
    pub replies_limit: Option<u32>,
    #[serde(default = "default_participant")]
    pub participant: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<Message>,
}

/// A rendered archive entry, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredObjectDto {
    Config(ConfigRecordDto),
    Bot(BotDefinitionDto),
    Chat(ChatSessionDto),
}

// ============================================================================
// Domain -> DTO
// ============================================================================

impl From<&ConfigRecord> for ConfigRecordDto {
    fn from(record: &ConfigRecord) -> Self {
        ConfigRecordDto {
            api_key: record.api_key.clone(),
            model: record.model.clone(),
        }
    }
}

impl From<&BotDefinition> for BotDefinitionDto {
    fn from(bot: &BotDefinition) -> Self {
        BotDefinitionDto {
            config: (&bot.config).into(),
            name: bot.name.clone(),
            rules: bot.rules.clone(),
            schema: bot.schema.clone(),
        }
    }
}

impl From<&ChatSession> for ChatSessionDto {
    fn from(chat: &ChatSession) -> Self {
        ChatSessionDto {
            bot: (&chat.bot).into(),
            title: chat.title.clone(),
            replies_limit: chat.replies_limit,
            participant: chat.participant.clone(),
            created_at: chat.created_at,
            history: chat.history.clone(),
        }
    }
}

impl From<&StoredObject> for StoredObjectDto {
    fn from(object: &StoredObject) -> Self {
        match object {
            StoredObject::Config(config) => StoredObjectDto::Config(config.into()),
            StoredObject::Bot(bot) => StoredObjectDto::Bot(bot.into()),
            StoredObject::Chat(chat) => StoredObjectDto::Chat(chat.into()),
        }
    }
}

// ============================================================================
// DTO -> Domain
// ============================================================================

impl From<ConfigRecordDto> for ConfigRecord {
    fn from(dto: ConfigRecordDto) -> Self {
        ConfigRecord::new(dto.api_key, dto.model)
    }
}

impl From<BotDefinitionDto> for BotDefinition {
    fn from(dto: BotDefinitionDto) -> Self {
        BotDefinition {
            config: dto.config.into(),
            name: dto.name,
            rules: dto.rules,
            schema: dto.schema,
        }
    }
}

impl From<ChatSessionDto> for ChatSession {
    fn from(dto: ChatSessionDto) -> Self {
        ChatSession {
            bot: dto.bot.into(),
            title: dto.title,
            replies_limit: dto.replies_limit,
            participant: dto.participant,
            created_at: dto.created_at,
            history: dto.history,
        }
    }
}

impl From<StoredObjectDto> for StoredObject {
    fn from(dto: StoredObjectDto) -> Self {
        match dto {
            StoredObjectDto::Config(config) => StoredObject::Config(config.into()),
            StoredObjectDto::Bot(bot) => StoredObject::Bot(bot.into()),
            StoredObjectDto::Chat(chat) => StoredObject::Chat(chat.into()),
        }
    }
}
