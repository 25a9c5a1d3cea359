//! Persistence layer for weft: the archive store, its file format, the
//! concurrent loader and the ambient settings/logging plumbing.

pub mod archive;
pub mod codec;
pub mod config;
pub mod dto;
pub mod loader;
pub mod logging;
pub mod paths;
pub mod probe;
pub mod storage;

pub use archive::{Archive, ArchiveGuard, ArchiveOptions, RemoveMode, Selector};
pub use codec::{Codec, EntryDecoder};
pub use config::{ArchiveSettings, LogSettings, WeftSettings, load_settings, load_settings_from};
pub use loader::{Backoff, ConcurrentLoader, RetryPolicy};
pub use logging::init_tracing;
pub use paths::WeftPaths;
pub use probe::HttpLivenessProbe;
pub use storage::AtomicTextFile;
