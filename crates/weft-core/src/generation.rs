//! Generator collaborator interface.
//!
//! The archive never talks to a language model itself. Chat sessions hand a
//! [`GenerationRequest`] to whatever [`Generator`] the caller supplies and
//! record the [`GenerationResult`] it returns.

use crate::error::Result;
use crate::record::{BotDefinition, Message};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Named JSON schema a completion must conform to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub properties: Map<String, Value>,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, properties: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    /// Every declared property is required in strict mode.
    pub fn required(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    /// Builds the provider `response_format` payload.
    pub fn resolve(&self) -> Value {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": self.name,
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": self.properties,
                    "required": self.required(),
                    "additionalProperties": false
                }
            }
        })
    }
}

/// Attachments that went into or came out of a completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMetadata {
    pub images: Vec<String>,
    pub files: Vec<String>,
}

/// Everything a generator needs to produce one reply.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub participant: &'a str,
    pub history: &'a [Message],
    pub images: Vec<String>,
    pub files: Vec<String>,
    pub schema: Option<&'a ResponseSchema>,
}

/// Outcome of one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub start_timestamp: String,
    pub elapsed: Duration,
    pub final_timestamp: String,
    pub input: AttachmentMetadata,
    pub output: AttachmentMetadata,
}

/// Produces bot replies. Implemented outside this workspace.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        bot: &BotDefinition,
        request: GenerationRequest<'_>,
    ) -> Result<GenerationResult>;
}
