//! On-disk layout of an archive file.
//!
//! ```json
//! {
//!   "schema_version": "1.0.0",
//!   "entries": { "0": "<rendered object>", "1": "<rendered object>" }
//! }
//! ```
//!
//! Entry keys are decimal ids and values are the texts produced by the codec.
//! A bare `{ "<id>": "<text>" }` mapping without the envelope is accepted on
//! read.

use crate::dto::ARCHIVE_SCHEMA_VERSION;
use semver::Version;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use weft_core::{Result, WeftError};

/// Raw `(id, text)` pairs in the order they appear in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntries(pub Vec<(u64, String)>);

impl Serialize for RawEntries {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, text) in &self.0 {
            map.serialize_entry(&id.to_string(), text)?;
        }
        map.end()
    }
}

struct RawEntriesVisitor;

impl<'de> Visitor<'de> for RawEntriesVisitor {
    type Value = RawEntries;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a mapping of decimal ids to entry texts")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        let mut seen = HashSet::new();

        while let Some((key, text)) = access.next_entry::<String, String>()? {
            let id: u64 = key.parse().map_err(|_| {
                <A::Error as de::Error>::custom(format!("id '{}' is not an integer", key))
            })?;
            if !seen.insert(id) {
                return Err(de::Error::custom(format!("duplicate id {}", id)));
            }
            entries.push((id, text));
        }

        Ok(RawEntries(entries))
    }
}

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RawEntriesVisitor)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ArchiveFileDto {
    schema_version: String,
    entries: RawEntries,
}

/// Wraps rendered entries in the versioned envelope.
pub fn encode(entries: Vec<(u64, String)>) -> Result<String> {
    let file = ArchiveFileDto {
        schema_version: ARCHIVE_SCHEMA_VERSION.to_string(),
        entries: RawEntries(entries),
    };
    serde_json::to_string_pretty(&file)
        .map_err(|e| WeftError::internal(format!("Failed to encode archive: {}", e)))
}

/// Parses the outer mapping. Blank text yields no entries.
pub fn decode(text: &str) -> Result<Vec<(u64, String)>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let outer: Value = serde_json::from_str(text)
        .map_err(|e| WeftError::format(format!("archive is not valid JSON: {}", e), text))?;

    let enveloped = matches!(&outer, Value::Object(map) if map.contains_key("schema_version"));
    if !enveloped {
        // Reparse from text: `Value` would reorder keys and fold duplicates.
        let RawEntries(entries) = serde_json::from_str(text)
            .map_err(|e| WeftError::format(format!("invalid archive mapping: {}", e), text))?;
        return Ok(entries);
    }

    let file: ArchiveFileDto = serde_json::from_str(text)
        .map_err(|e| WeftError::format(format!("invalid archive envelope: {}", e), text))?;
    check_version(&file.schema_version, text)?;
    Ok(file.entries.0)
}

fn check_version(found: &str, text: &str) -> Result<()> {
    let current = Version::parse(ARCHIVE_SCHEMA_VERSION)
        .map_err(|e| WeftError::internal(format!("Bad archive schema version constant: {}", e)))?;
    let found_version = Version::parse(found).map_err(|e| {
        WeftError::format(format!("invalid schema_version '{}': {}", found, e), text)
    })?;

    if found_version.major != current.major {
        return Err(WeftError::format(
            format!(
                "unsupported schema_version {} (expected {}.x)",
                found_version, current.major
            ),
            text,
        ));
    }
    if found_version > current {
        tracing::warn!(found = %found_version, current = %current, "Archive written by a newer minor version");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_keeps_given_order() {
        let text = encode(vec![(5, "b".to_string()), (1, "a".to_string())]).unwrap();
        assert!(text.contains("\"schema_version\": \"1.0.0\""));
        assert!(text.find("\"5\"").unwrap() < text.find("\"1\"").unwrap());
        assert_eq!(decode(&text).unwrap(), vec![(5, "b".to_string()), (1, "a".to_string())]);
    }

    #[test]
    fn test_blank_text_has_no_entries() {
        assert!(decode("").unwrap().is_empty());
        assert!(decode(" \n\t").unwrap().is_empty());
    }

    #[test]
    fn test_bare_mapping_is_accepted_in_file_order() {
        let entries = decode(r#"{"3": "c", "0": "a", "10": "b"}"#).unwrap();
        let ids: Vec<u64> = entries.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![3, 0, 10]);
    }

    #[test]
    fn test_bare_empty_mapping() {
        assert!(decode("{}").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_outer_text_is_a_format_error() {
        let err = decode("{\"0\": ").unwrap_err();
        assert!(err.is_format());
        match err {
            WeftError::Format { raw, .. } => assert_eq!(raw, "{\"0\": "),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_integer_and_duplicate_ids_are_rejected() {
        assert!(decode(r#"{"zero": "a"}"#).unwrap_err().is_format());
        assert!(decode(r#"{"-1": "a"}"#).unwrap_err().is_format());
        assert!(decode(r#"{"1": "a", "1": "b"}"#).unwrap_err().is_format());
        assert!(decode(r#"{"1": 7}"#).unwrap_err().is_format());
        assert!(decode("[1, 2]").unwrap_err().is_format());
    }

    #[test]
    fn test_other_major_version_is_rejected() {
        let err = decode(r#"{"schema_version": "2.0.0", "entries": {}}"#).unwrap_err();
        assert!(err.to_string().contains("unsupported schema_version"));
    }

    #[test]
    fn test_newer_minor_version_is_read() {
        let entries = decode(r#"{"schema_version": "1.3.0", "entries": {"0": "x"}}"#).unwrap();
        assert_eq!(entries, vec![(0, "x".to_string())]);
    }

    #[test]
    fn test_malformed_version_is_rejected() {
        assert!(decode(r#"{"schema_version": "one", "entries": {}}"#).unwrap_err().is_format());
    }
}
