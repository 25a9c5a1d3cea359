//! Textual encoding of archive entries.
//!
//! An entry is rendered as a JSON object tagged with `kind`. Parsing dispatches
//! on that tag to one of the three record constructors; nothing in the text is
//! ever evaluated.

use crate::dto::{KNOWN_KINDS, StoredObjectDto};
use serde_json::Value;
use weft_core::{Result, StoredObject, WeftError};

/// Rebuilds a stored object from its rendered text.
///
/// The concurrent loader only talks to this trait, so alternative decoders
/// can be swapped in.
pub trait EntryDecoder: Send + Sync {
    fn decode(&self, text: &str) -> Result<StoredObject>;
}

/// JSON codec for [`StoredObject`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec;

impl Codec {
    /// Renders an object using only its public constructor fields.
    pub fn render(object: &StoredObject) -> Result<String> {
        let dto = StoredObjectDto::from(object);
        serde_json::to_string(&dto)
            .map_err(|e| WeftError::internal(format!("Failed to render {}: {}", object.kind(), e)))
    }

    /// Parses text produced by [`Codec::render`].
    ///
    /// Fails with a format error on empty text, invalid JSON, an unknown
    /// `kind`, or a value that is not a tagged object.
    pub fn parse(text: &str) -> Result<StoredObject> {
        if text.trim().is_empty() {
            return Err(WeftError::format("empty entry text", text));
        }

        let value: Value = serde_json::from_str(text)
            .map_err(|e| WeftError::format(format!("invalid syntax: {}", e), text))?;

        let kind = match value.get("kind") {
            Some(Value::String(kind)) => kind.as_str(),
            Some(_) => {
                return Err(WeftError::format("'kind' tag must be a string", text));
            }
            None => {
                return Err(WeftError::format(
                    "value is not a supported variant (missing 'kind' tag)",
                    text,
                ));
            }
        };

        if !KNOWN_KINDS.contains(&kind) {
            return Err(WeftError::format(format!("unknown kind '{}'", kind), text));
        }

        let dto: StoredObjectDto = serde_json::from_value(value)
            .map_err(|e| WeftError::format(format!("invalid fields: {}", e), text))?;
        Ok(dto.into())
    }
}

impl EntryDecoder for Codec {
    fn decode(&self, text: &str) -> Result<StoredObject> {
        Codec::parse(text)
    }
}
