//! Error types for the Weft archive.

use thiserror::Error;

/// A shared error type for the whole Weft workspace.
///
/// Every public operation either succeeds or returns one of these variants
/// with enough context (id, selector, raw text) to identify what went wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeftError {
    /// Textual representation could not be parsed.
    #[error("Format error: {message} (raw: {raw:?})")]
    Format { message: String, raw: String },

    /// An entry could not be rebuilt into a supported variant.
    #[error("Reconstruction error (id={id}): {message}")]
    Reconstruction { id: u64, message: String },

    /// An operation referenced an id that does not exist.
    #[error("Identifier not found: {id}")]
    Identifier { id: u64 },

    /// An argument was outside the supported type set.
    #[error("Unsupported selector: {0}")]
    SelectorType(String),

    /// A value-based lookup found no stored entry.
    #[error("No stored entry matches: {0}")]
    NoMatch(String),

    /// Credential or model-name validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WeftError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Format error carrying the offending text.
    pub fn format(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Creates a Reconstruction error for the given entry id.
    pub fn reconstruction(id: u64, message: impl Into<String>) -> Self {
        Self::Reconstruction {
            id,
            message: message.into(),
        }
    }

    /// Creates an Identifier error
    pub fn identifier(id: u64) -> Self {
        Self::Identifier { id }
    }

    /// Creates a SelectorType error
    pub fn selector_type(message: impl Into<String>) -> Self {
        Self::SelectorType(message.into())
    }

    /// Creates a NoMatch error
    pub fn no_match(message: impl Into<String>) -> Self {
        Self::NoMatch(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    pub fn is_reconstruction(&self) -> bool {
        matches!(self, Self::Reconstruction { .. })
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier { .. })
    }

    pub fn is_selector_type(&self) -> bool {
        matches!(self, Self::SelectorType(_))
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the entry id this error refers to, if any.
    pub fn entry_id(&self) -> Option<u64> {
        match self {
            Self::Reconstruction { id, .. } | Self::Identifier { id } => Some(*id),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for WeftError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for WeftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format {
            message: format!("JSON - {}", err),
            raw: String::new(),
        }
    }
}

impl From<toml::de::Error> for WeftError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("TOML - {}", err))
    }
}

/// A type alias for `Result<T, WeftError>`.
pub type Result<T> = std::result::Result<T, WeftError>;
