//! Concurrent, chunked, retrying reconstruction of archive entries.

use super::planner::{self, DEFAULT_CHUNK_THRESHOLD};
use super::retry::RetryPolicy;
use crate::codec::{Codec, EntryDecoder};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use weft_core::{CredentialValidator, Result, StoredObject, WeftError};

/// Rebuilds raw `(id, text)` entries into stored objects.
///
/// Entries are split by the chunking planner and every chunk runs as its own
/// task. Inside a chunk entries are decoded in listed order, each one retried
/// under the configured [`RetryPolicy`]. The first failing chunk cancels the
/// rest and no partial mapping is returned.
pub struct ConcurrentLoader {
    decoder: Arc<dyn EntryDecoder>,
    retry: RetryPolicy,
    validator: Option<Arc<CredentialValidator>>,
    chunk_threshold: usize,
}

impl ConcurrentLoader {
    pub fn new(decoder: Arc<dyn EntryDecoder>) -> Self {
        Self {
            decoder,
            retry: RetryPolicy::default(),
            validator: None,
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Validates every decoded record's credentials before accepting it.
    pub fn with_validator(mut self, validator: Option<Arc<CredentialValidator>>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_chunk_threshold(mut self, threshold: usize) -> Self {
        self.chunk_threshold = threshold;
        self
    }

    pub async fn load(&self, entries: Vec<(u64, String)>) -> Result<BTreeMap<u64, StoredObject>> {
        let total = entries.len();
        let chunks = planner::plan(entries, self.chunk_threshold);
        let chunk_count = chunks.len();

        let mut tasks = JoinSet::new();
        for (index, chunk) in chunks.into_iter().enumerate() {
            let decoder = Arc::clone(&self.decoder);
            let validator = self.validator.clone();
            let retry = self.retry;

            tasks.spawn(async move {
                tracing::debug!(chunk = index, size = chunk.len(), "Loading chunk");
                load_chunk(chunk, decoder.as_ref(), &retry, validator.as_deref()).await
            });
        }

        let mut merged = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let loaded = match joined {
                Ok(Ok(loaded)) => loaded,
                Ok(Err(e)) => {
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(WeftError::internal(format!("Chunk task failed: {}", e)));
                }
            };

            for (id, object) in loaded {
                if merged.insert(id, object).is_some() {
                    tasks.abort_all();
                    return Err(WeftError::internal(format!(
                        "Entry {} was loaded by more than one chunk",
                        id
                    )));
                }
            }
        }

        tracing::info!(entries = total, chunks = chunk_count, "Loaded archive entries");
        Ok(merged)
    }
}

impl Default for ConcurrentLoader {
    fn default() -> Self {
        Self::new(Arc::new(Codec))
    }
}

async fn load_chunk(
    chunk: Vec<(u64, String)>,
    decoder: &dyn EntryDecoder,
    retry: &RetryPolicy,
    validator: Option<&CredentialValidator>,
) -> Result<Vec<(u64, StoredObject)>> {
    let mut loaded = Vec::with_capacity(chunk.len());

    for (id, text) in chunk {
        let object = retry
            .run(|_| decoder.decode(&text))
            .await
            .map_err(|e| WeftError::reconstruction(id, e.to_string()))?;

        // Credential failures are not transient.
        if let Some(validator) = validator {
            validator.validate(object.config()).await?;
        }

        loaded.push((id, object));
    }

    Ok(loaded)
}
