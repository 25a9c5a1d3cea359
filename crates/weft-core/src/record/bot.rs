//! Bot definition: a configuration record plus a name and instruction rules.

use super::config::ConfigRecord;
use crate::generation::ResponseSchema;
use std::fmt;

/// Name given to bots created without one.
pub const DEFAULT_BOT_NAME: &str = "AI Bot";

/// Instruction rules given to bots created without any.
pub const DEFAULT_RULES: &str = "You are a helpful assistant. Answer clearly and concisely, \
mirror the language the user writes in, and say so when you do not know something.";

/// A named bot with its behaviour rules.
#[derive(Debug, Clone, PartialEq)]
pub struct BotDefinition {
    pub config: ConfigRecord,
    pub name: String,
    pub rules: String,
    /// Structured-output schema requested on every completion, if any.
    pub schema: Option<ResponseSchema>,
}

impl BotDefinition {
    pub fn new(config: ConfigRecord) -> Self {
        Self {
            config,
            name: DEFAULT_BOT_NAME.to_string(),
            rules: DEFAULT_RULES.to_string(),
            schema: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = rules.into();
        self
    }

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Rules as sent to the model, with the bot's name appended.
    pub fn system_prompt(&self) -> String {
        format!("{} Your name is {}", self.rules, self.name)
    }
}

impl fmt::Display for BotDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Bot | {}>", self.name)
    }
}
