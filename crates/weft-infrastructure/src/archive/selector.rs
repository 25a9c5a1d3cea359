//! Removal selectors and their resolution against the archive mapping.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use weft_core::record::{BotDefinition, ChatSession, ConfigRecord};
use weft_core::{Result, StoredObject, WeftError};

/// What to remove: an id, every entry equal to a value, or a group of both.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Id(u64),
    Object(StoredObject),
    /// A flat group; nesting another group inside is rejected.
    Many(Vec<Selector>),
}

/// Which matches of an object selector are removed. Id selectors ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemoveMode {
    #[default]
    All,
    First,
    Last,
}

impl RemoveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoveMode::All => "all",
            RemoveMode::First => "first",
            RemoveMode::Last => "last",
        }
    }
}

impl FromStr for RemoveMode {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(RemoveMode::All),
            "first" => Ok(RemoveMode::First),
            "last" => Ok(RemoveMode::Last),
            other => Err(WeftError::selector_type(format!(
                "unknown removal mode '{}' (expected all, first or last)",
                other
            ))),
        }
    }
}

impl fmt::Display for RemoveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<u64> for Selector {
    fn from(id: u64) -> Self {
        Selector::Id(id)
    }
}

impl From<StoredObject> for Selector {
    fn from(object: StoredObject) -> Self {
        Selector::Object(object)
    }
}

impl From<ConfigRecord> for Selector {
    fn from(value: ConfigRecord) -> Self {
        Selector::Object(value.into())
    }
}

impl From<BotDefinition> for Selector {
    fn from(value: BotDefinition) -> Self {
        Selector::Object(value.into())
    }
}

impl From<ChatSession> for Selector {
    fn from(value: ChatSession) -> Self {
        Selector::Object(value.into())
    }
}

impl From<Vec<Selector>> for Selector {
    fn from(items: Vec<Selector>) -> Self {
        Selector::Many(items)
    }
}

impl From<Vec<u64>> for Selector {
    fn from(ids: Vec<u64>) -> Self {
        Selector::Many(ids.into_iter().map(Selector::Id).collect())
    }
}

/// Ascending ids whose value equals `object`.
pub(crate) fn matching_ids(entries: &BTreeMap<u64, StoredObject>, object: &StoredObject) -> Vec<u64> {
    entries
        .iter()
        .filter(|(_, stored)| *stored == object)
        .map(|(id, _)| *id)
        .collect()
}

/// Resolves a selector to the ids it removes, without touching the mapping.
///
/// Elements of a group see the effect of earlier elements, so an id already
/// claimed cannot be claimed again. Any unresolvable element fails the whole
/// selector.
pub(crate) fn resolve(
    entries: &BTreeMap<u64, StoredObject>,
    selector: &Selector,
    mode: RemoveMode,
) -> Result<Vec<u64>> {
    let mut removed = HashSet::new();
    let mut order = Vec::new();

    match selector {
        Selector::Many(items) => {
            for item in items {
                if matches!(item, Selector::Many(_)) {
                    return Err(WeftError::selector_type(
                        "nested selector groups are not supported",
                    ));
                }
                resolve_single(entries, item, mode, &mut removed, &mut order)?;
            }
        }
        single => resolve_single(entries, single, mode, &mut removed, &mut order)?,
    }

    Ok(order)
}

fn resolve_single(
    entries: &BTreeMap<u64, StoredObject>,
    selector: &Selector,
    mode: RemoveMode,
    removed: &mut HashSet<u64>,
    order: &mut Vec<u64>,
) -> Result<()> {
    let claimed: Vec<u64> = match selector {
        Selector::Id(id) => {
            if !entries.contains_key(id) || removed.contains(id) {
                return Err(WeftError::identifier(*id));
            }
            vec![*id]
        }
        Selector::Object(object) => {
            let matches: Vec<u64> = matching_ids(entries, object)
                .into_iter()
                .filter(|id| !removed.contains(id))
                .collect();
            if matches.is_empty() {
                return Err(WeftError::no_match(object.to_string()));
            }
            match mode {
                RemoveMode::All => matches,
                RemoveMode::First => matches[..1].to_vec(),
                RemoveMode::Last => matches[matches.len() - 1..].to_vec(),
            }
        }
        Selector::Many(_) => {
            return Err(WeftError::selector_type(
                "nested selector groups are not supported",
            ));
        }
    };

    for id in claimed {
        removed.insert(id);
        order.push(id);
    }
    Ok(())
}
