//! Integer-keyed archive of stored objects backed by one file.

use super::file_format;
use super::guard::ArchiveGuard;
use super::selector::{self, RemoveMode, Selector};
use crate::codec::{Codec, EntryDecoder};
use crate::loader::{ConcurrentLoader, DEFAULT_CHUNK_THRESHOLD, RetryPolicy};
use crate::storage::AtomicTextFile;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use weft_core::{CredentialValidator, Result, StoredObject, WeftError};

/// Load-time behaviour of an [`Archive`].
#[derive(Clone)]
pub struct ArchiveOptions {
    /// Reconstruct entries concurrently in chunks instead of one by one.
    pub asynchronous: bool,
    pub retry: RetryPolicy,
    pub chunk_threshold: usize,
    pub validator: Option<Arc<CredentialValidator>>,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            asynchronous: true,
            retry: RetryPolicy::default(),
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            validator: None,
        }
    }
}

/// A file-backed mapping of ids to stored objects.
///
/// The mapping is loaded lazily: a new archive, or one whose path changed, is
/// dirty and reloads from disk on the next read. Mutations apply to memory
/// only until [`Archive::save`] is called.
///
/// One `Archive` per file is assumed. Nothing guards against another process
/// writing the same file.
pub struct Archive {
    file: AtomicTextFile,
    entries: BTreeMap<u64, StoredObject>,
    dirty: bool,
    asynchronous: bool,
    retry: RetryPolicy,
    chunk_threshold: usize,
    decoder: Arc<dyn EntryDecoder>,
    validator: Option<Arc<CredentialValidator>>,
}

impl Archive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, ArchiveOptions::default())
    }

    pub fn with_options(path: impl Into<PathBuf>, options: ArchiveOptions) -> Self {
        Self {
            file: AtomicTextFile::new(path),
            entries: BTreeMap::new(),
            dirty: true,
            asynchronous: options.asynchronous,
            retry: options.retry,
            chunk_threshold: options.chunk_threshold,
            decoder: Arc::new(Codec),
            validator: options.validator,
        }
    }

    /// Replaces the entry decoder used by [`Archive::retrieve`].
    pub fn with_decoder(mut self, decoder: Arc<dyn EntryDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_asynchronous(&self) -> bool {
        self.asynchronous
    }

    pub fn set_asynchronous(&mut self, asynchronous: bool) {
        self.asynchronous = asynchronous;
    }

    pub fn set_retry_policy(&mut self, retry: RetryPolicy) {
        self.retry = retry;
    }

    /// Points the archive at another existing file. The current mapping is
    /// discarded and reloaded from the new file on the next read.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        if !path.is_file() {
            return Err(WeftError::io(format!(
                "Archive file not found: {}",
                path.display()
            )));
        }

        self.file = AtomicTextFile::new(path);
        self.entries.clear();
        self.dirty = true;
        Ok(())
    }

    /// Writes the current contents to `path` and continues from there.
    pub async fn relocate(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.loaded().await?;
        let target = AtomicTextFile::new(path);
        self.write_to(&target)?;
        tracing::info!(from = %self.path().display(), to = %target.path().display(), "Relocated archive");
        self.file = target;
        Ok(())
    }

    /// Reads the backing file and rebuilds the mapping from it.
    ///
    /// A missing or blank file yields an empty mapping. On failure the
    /// previous mapping is kept and the archive stays dirty.
    pub async fn retrieve(&mut self) -> Result<&BTreeMap<u64, StoredObject>> {
        let raw = match self.file.load()? {
            Some(text) => file_format::decode(&text)?,
            None => Vec::new(),
        };

        let entries = if self.asynchronous {
            ConcurrentLoader::new(Arc::clone(&self.decoder))
                .with_retry(self.retry)
                .with_validator(self.validator.clone())
                .with_chunk_threshold(self.chunk_threshold)
                .load(raw)
                .await?
        } else {
            self.decode_in_order(raw).await?
        };

        tracing::debug!(path = %self.path().display(), entries = entries.len(), "Retrieved archive");
        self.entries = entries;
        self.dirty = false;
        Ok(&self.entries)
    }

    async fn decode_in_order(&self, raw: Vec<(u64, String)>) -> Result<BTreeMap<u64, StoredObject>> {
        let mut entries = BTreeMap::new();
        for (id, text) in raw {
            let object = self
                .decoder
                .decode(&text)
                .map_err(|e| WeftError::reconstruction(id, e.to_string()))?;
            if let Some(validator) = &self.validator {
                validator.validate(object.config()).await?;
            }
            entries.insert(id, object);
        }
        Ok(entries)
    }

    /// Marks the mapping stale and reloads it.
    pub async fn reload(&mut self) -> Result<&BTreeMap<u64, StoredObject>> {
        self.dirty = true;
        self.retrieve().await
    }

    async fn loaded(&mut self) -> Result<&mut BTreeMap<u64, StoredObject>> {
        if self.dirty {
            self.retrieve().await?;
        }
        Ok(&mut self.entries)
    }

    /// Current contents, reloading first when dirty.
    pub async fn entries(&mut self) -> Result<&BTreeMap<u64, StoredObject>> {
        Ok(self.loaded().await?)
    }

    pub async fn len(&mut self) -> Result<usize> {
        Ok(self.loaded().await?.len())
    }

    pub async fn is_empty(&mut self) -> Result<bool> {
        Ok(self.loaded().await?.is_empty())
    }

    /// The id the next [`Archive::add`] will assign.
    pub async fn next_id(&mut self) -> Result<u64> {
        next_id_of(self.loaded().await?)
    }

    pub async fn contains_id(&mut self, id: u64) -> Result<bool> {
        Ok(self.loaded().await?.contains_key(&id))
    }

    pub async fn get(&mut self, id: u64) -> Result<Option<&StoredObject>> {
        Ok(self.loaded().await?.get(&id))
    }

    /// Ascending ids whose stored value equals `object`.
    pub async fn lookup_ids(&mut self, object: &StoredObject) -> Result<Vec<u64>> {
        Ok(selector::matching_ids(self.loaded().await?, object))
    }

    /// Stores `object` under the next free id and returns that id.
    pub async fn add(&mut self, object: impl Into<StoredObject>) -> Result<u64> {
        let object = object.into();
        let entries = self.loaded().await?;
        let id = next_id_of(entries)?;
        tracing::debug!(id, kind = object.kind(), "Adding archive entry");
        entries.insert(id, object);
        Ok(id)
    }

    /// Removes whatever `selector` resolves to and returns the removed ids.
    ///
    /// Either every element resolves and all of them are removed, or nothing
    /// changes.
    pub async fn remove(&mut self, selector: impl Into<Selector>, mode: RemoveMode) -> Result<Vec<u64>> {
        let selector = selector.into();
        let entries = self.loaded().await?;
        let ids = selector::resolve(entries, &selector, mode)?;
        for id in &ids {
            entries.remove(id);
        }
        tracing::debug!(removed = ?ids, %mode, "Removed archive entries");
        Ok(ids)
    }

    /// Writes the mapping to the backing file, ordered by
    /// [`StoredObject::ordering_key`].
    ///
    /// An archive that was never loaded has nothing newer than its file, so
    /// nothing is written.
    pub fn save(&self) -> Result<()> {
        if self.dirty {
            tracing::debug!(path = %self.path().display(), "Archive not loaded, skipping save");
            return Ok(());
        }
        self.write_to(&self.file)
    }

    fn write_to(&self, file: &AtomicTextFile) -> Result<()> {
        let mut ordered: Vec<(&u64, &StoredObject)> = self.entries.iter().collect();
        ordered.sort_by_key(|(id, object)| object.ordering_key(**id));

        let rendered = ordered
            .into_iter()
            .map(|(id, object)| -> Result<(u64, String)> { Ok((*id, Codec::render(object)?)) })
            .collect::<Result<Vec<_>>>()?;
        let count = rendered.len();

        file.save(&file_format::encode(rendered)?)?;
        tracing::info!(path = %file.path().display(), entries = count, "Saved archive");
        Ok(())
    }

    /// Wraps the archive in a guard that saves it when dropped.
    pub fn scoped(self) -> ArchiveGuard {
        ArchiveGuard::new(self)
    }
}

/// One past the current maximum id. Removing the maximum frees its id.
fn next_id_of(entries: &BTreeMap<u64, StoredObject>) -> Result<u64> {
    match entries.keys().next_back() {
        None => Ok(0),
        Some(&max) => max.checked_add(1).ok_or_else(|| {
            WeftError::internal(format!("No id left after {}; the archive is full", max))
        }),
    }
}

impl fmt::Display for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Archive | path={}>", self.path().display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use weft_core::record::{BotDefinition, ChatSession, ConfigRecord};

    const KEY: &str = "sk-test-0000000000000000";

    fn config(model: &str) -> ConfigRecord {
        ConfigRecord::new(KEY, model)
    }

    fn archive_in(dir: &TempDir) -> Archive {
        Archive::new(dir.path().join("archive.json"))
    }

    #[tokio::test]
    async fn test_new_archive_is_dirty_and_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut archive = archive_in(&dir);

        assert!(archive.is_dirty());
        assert!(archive.entries().await.unwrap().is_empty());
        assert!(!archive.is_dirty());
    }

    #[tokio::test]
    async fn test_ids_follow_current_max() {
        let dir = TempDir::new().unwrap();
        let mut archive = archive_in(&dir);

        assert_eq!(archive.add(config("o1")).await.unwrap(), 0);
        assert_eq!(archive.add(config("o1")).await.unwrap(), 1);
        archive.remove(0u64, RemoveMode::All).await.unwrap();
        assert_eq!(archive.add(config("o3")).await.unwrap(), 2);
        // Removing the maximum frees its id for the next add.
        archive.remove(2u64, RemoveMode::All).await.unwrap();
        assert_eq!(archive.next_id().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_id_space_fails_without_overwriting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archive.json");
        let text = Codec::render(&StoredObject::from(config("o1"))).unwrap();
        std::fs::write(
            &path,
            file_format::encode(vec![(0, text.clone()), (u64::MAX, text)]).unwrap(),
        )
        .unwrap();

        let mut archive = Archive::new(&path);
        assert!(archive.next_id().await.is_err());

        let err = archive.add(config("o3")).await.unwrap_err();
        assert!(err.to_string().contains(&u64::MAX.to_string()));
        assert_eq!(archive.len().await.unwrap(), 2);
        assert_eq!(archive.get(0).await.unwrap(), Some(&StoredObject::from(config("o1"))));
    }

    #[tokio::test]
    async fn test_lookup_ids_finds_every_equal_value() {
        let dir = TempDir::new().unwrap();
        let mut archive = archive_in(&dir);
        archive.add(config("o1")).await.unwrap();
        archive.add(BotDefinition::new(config("o1"))).await.unwrap();
        archive.add(config("o1")).await.unwrap();

        let ids = archive.lookup_ids(&StoredObject::from(config("o1"))).await.unwrap();
        assert_eq!(ids, vec![0, 2]);
        assert!(archive.lookup_ids(&StoredObject::from(config("o3"))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_orders_undated_records_before_chats() {
        let dir = TempDir::new().unwrap();
        let mut archive = archive_in(&dir);
        let bot = BotDefinition::new(config("gpt-4o"));
        archive.add(ChatSession::new(bot.clone())).await.unwrap();
        archive.add(bot).await.unwrap();
        archive.save().unwrap();

        let text = std::fs::read_to_string(archive.path()).unwrap();
        let ids: Vec<u64> = file_format::decode(&text)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![1, 0]);
    }

    #[tokio::test]
    async fn test_save_before_load_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let archive = archive_in(&dir);
        archive.save().unwrap();
        assert!(!archive.path().exists());
    }

    #[tokio::test]
    async fn test_malformed_file_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archive.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut archive = Archive::new(&path);
        let err = archive.retrieve().await.unwrap_err();
        assert!(err.is_format());
        assert!(archive.is_dirty());
    }

    #[tokio::test]
    async fn test_sync_mode_reports_failing_id_without_retry() {
        struct Counting(AtomicU32);
        impl EntryDecoder for Counting {
            fn decode(&self, text: &str) -> Result<StoredObject> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Codec::parse(text)
            }
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archive.json");
        let good = Codec::render(&StoredObject::from(config("o1"))).unwrap();
        std::fs::write(&path, file_format::encode(vec![(4, good), (9, "{}".to_string())]).unwrap()).unwrap();

        let decoder = Arc::new(Counting(AtomicU32::new(0)));
        let mut archive = Archive::new(&path).with_decoder(decoder.clone());
        archive.set_asynchronous(false);

        let err = archive.retrieve().await.unwrap_err();
        assert_eq!(err.entry_id(), Some(9));
        assert_eq!(decoder.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_async_mode_retries_failing_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archive.json");
        std::fs::write(&path, r#"{"0": "{\"kind\":\"loom\"}"}"#).unwrap();

        let mut archive = Archive::new(&path);
        archive.set_retry_policy(RetryPolicy::fixed(Duration::from_millis(1)));
        let err = archive.retrieve().await.unwrap_err();
        assert!(err.is_reconstruction());
        assert!(err.to_string().contains("6 attempts"));
    }

    #[tokio::test]
    async fn test_set_path_requires_existing_file_and_marks_dirty() {
        let dir = TempDir::new().unwrap();
        let mut archive = archive_in(&dir);
        archive.add(config("o1")).await.unwrap();

        assert!(archive.set_path(dir.path().join("missing.json")).is_err());
        assert!(!archive.is_dirty());

        let other = dir.path().join("other.json");
        std::fs::write(&other, "").unwrap();
        archive.set_path(&other).unwrap();
        assert!(archive.is_dirty());
        assert!(archive.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_relocate_writes_current_contents() {
        let dir = TempDir::new().unwrap();
        let mut archive = archive_in(&dir);
        archive.add(config("o1")).await.unwrap();

        let target = dir.path().join("nested").join("moved.json");
        archive.relocate(&target).await.unwrap();
        assert_eq!(archive.path(), target.as_path());

        let mut reopened = Archive::new(&target);
        assert_eq!(reopened.len().await.unwrap(), 1);
    }

    #[test]
    fn test_display_shows_path() {
        let archive = Archive::new("/tmp/weft/archive.json");
        assert_eq!(archive.to_string(), "<Archive | path=/tmp/weft/archive.json>");
    }
}
