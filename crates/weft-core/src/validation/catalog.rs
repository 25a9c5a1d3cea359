//! Known model names.

use std::collections::BTreeSet;

/// Model names shipped as the default catalog.
pub const DEFAULT_MODELS: &[&str] = &["gpt-4", "gpt-4o", "gpt-4-turbo", "o1", "o1-mini", "o3"];

/// The set of model names a [`ConfigRecord`](crate::record::ConfigRecord) may select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: BTreeSet<String>,
}

impl ModelCatalog {
    pub fn empty() -> Self {
        Self {
            models: BTreeSet::new(),
        }
    }

    /// Adds a model name. Surrounding whitespace is ignored; blank names are
    /// rejected and `false` is returned.
    pub fn add(&mut self, model: &str) -> bool {
        let model = model.trim();
        if model.is_empty() {
            return false;
        }
        self.models.insert(model.to_string());
        true
    }

    pub fn remove(&mut self, model: &str) -> bool {
        self.models.remove(model.trim())
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains(model)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        for model in DEFAULT_MODELS {
            catalog.add(model);
        }
        catalog
    }
}
