use std::collections::HashSet;
use tokio::sync::RwLock;

/// Remembers credentials and model names that already passed validation.
///
/// One cache is created per process (or per test) and handed to the
/// validator explicitly; nothing here is global.
#[derive(Debug, Default)]
pub struct ValidationCache {
    api_keys: RwLock<HashSet<String>>,
    models: RwLock<HashSet<String>>,
}

impl ValidationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn has_api_key(&self, api_key: &str) -> bool {
        self.api_keys.read().await.contains(api_key)
    }

    pub async fn insert_api_key(&self, api_key: &str) {
        self.api_keys.write().await.insert(api_key.to_string());
    }

    pub async fn forget_api_key(&self, api_key: &str) -> bool {
        self.api_keys.write().await.remove(api_key)
    }

    pub async fn has_model(&self, model: &str) -> bool {
        self.models.read().await.contains(model)
    }

    pub async fn insert_model(&self, model: &str) {
        self.models.write().await.insert(model.to_string());
    }

    /// Clears all cached entries.
    pub async fn clear(&self) {
        self.api_keys.write().await.clear();
        self.models.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_forget_and_clear() {
        let cache = ValidationCache::new();
        assert!(!cache.has_api_key("sk-x").await);

        cache.insert_api_key("sk-x").await;
        cache.insert_model("o3").await;
        assert!(cache.has_api_key("sk-x").await);
        assert!(cache.has_model("o3").await);

        assert!(cache.forget_api_key("sk-x").await);
        assert!(!cache.has_api_key("sk-x").await);

        cache.clear().await;
        assert!(!cache.has_model("o3").await);
    }
}
