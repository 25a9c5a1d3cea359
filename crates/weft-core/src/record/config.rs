//! Configuration record: an API credential paired with a model selector.

use std::fmt;

/// Model used when a record is created without an explicit selector.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Holds the credential and model name every bot and chat is built on.
///
/// Equality is field-wise; two records with the same key and model are the
/// same record for lookup purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigRecord {
    pub api_key: String,
    pub model: String,
}

impl ConfigRecord {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Creates a record using [`DEFAULT_MODEL`].
    pub fn with_default_model(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_MODEL)
    }

    /// Returns the key with its middle elided, for logs and display.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 16 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 8..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Display for ConfigRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ConfigRecord | model={}, api_key={}>", self.model, self.masked_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_key_hides_middle() {
        let record = ConfigRecord::with_default_model("sk-abcdefgh12345678ijklmnop");
        assert_eq!(record.masked_key(), "sk-abcde...ijklmnop");
        assert_eq!(record.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_short_key_is_fully_masked() {
        let record = ConfigRecord::new("sk-short", "o1");
        assert_eq!(record.masked_key(), "********");
        assert!(!record.to_string().contains("sk-short"));
    }

    #[test]
    fn test_equality_is_field_wise() {
        let a = ConfigRecord::new("sk-aaaaaaaaaaaaaaaaaaaa", "o3");
        let b = ConfigRecord::new("sk-aaaaaaaaaaaaaaaaaaaa", "o3");
        let c = ConfigRecord::new("sk-aaaaaaaaaaaaaaaaaaaa", "o1");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
