//! Credential and model-name validation.

use super::cache::ValidationCache;
use super::catalog::ModelCatalog;
use crate::error::{Result, WeftError};
use crate::record::ConfigRecord;
use async_trait::async_trait;
use std::sync::Arc;

/// Required prefix of provider API keys.
pub const API_KEY_PREFIX: &str = "sk-";

/// Minimum accepted API key length.
pub const MIN_API_KEY_LEN: usize = 20;

/// Confirms that a credential is accepted by the provider.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn probe(&self, api_key: &str) -> Result<()>;
}

/// Checks the shape of an API key without contacting anyone.
pub fn check_key_format(api_key: &str) -> Result<()> {
    if api_key.is_empty() {
        return Err(WeftError::validation("Invalid API key format: empty key"));
    }
    if !api_key.starts_with(API_KEY_PREFIX) || api_key.len() < MIN_API_KEY_LEN {
        return Err(WeftError::validation(format!(
            "Invalid API key format: expected '{}' prefix and at least {} characters",
            API_KEY_PREFIX, MIN_API_KEY_LEN
        )));
    }
    Ok(())
}

/// Validates configuration records against a model catalog and a liveness
/// probe, caching successes so each credential is probed once.
pub struct CredentialValidator {
    catalog: ModelCatalog,
    cache: Arc<ValidationCache>,
    probe: Arc<dyn LivenessProbe>,
}

impl CredentialValidator {
    pub fn new(catalog: ModelCatalog, probe: Arc<dyn LivenessProbe>) -> Self {
        Self {
            catalog,
            cache: Arc::new(ValidationCache::new()),
            probe,
        }
    }

    /// Shares an existing cache instead of starting with an empty one.
    pub fn with_cache(mut self, cache: Arc<ValidationCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &Arc<ValidationCache> {
        &self.cache
    }

    pub async fn validate_model(&self, model: &str) -> Result<()> {
        if self.cache.has_model(model).await {
            return Ok(());
        }
        if !self.catalog.contains(model) {
            return Err(WeftError::validation(format!("'{}' is not acceptable", model)));
        }
        self.cache.insert_model(model).await;
        Ok(())
    }

    pub async fn validate_api_key(&self, api_key: &str) -> Result<()> {
        if self.cache.has_api_key(api_key).await {
            return Ok(());
        }
        check_key_format(api_key)?;
        self.probe
            .probe(api_key)
            .await
            .map_err(|e| WeftError::validation(format!("Invalid API key: {}", e)))?;
        tracing::debug!("Credential passed liveness probe");
        self.cache.insert_api_key(api_key).await;
        Ok(())
    }

    /// Validates both halves of a record. The model is checked first so an
    /// unknown model never costs a network round-trip.
    pub async fn validate(&self, record: &ConfigRecord) -> Result<()> {
        self.validate_model(&record.model).await?;
        self.validate_api_key(&record.api_key).await
    }
}
