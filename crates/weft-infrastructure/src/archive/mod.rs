//! The archive store and its on-disk format.

pub mod file_format;
mod guard;
mod selector;
mod store;

pub use guard::ArchiveGuard;
pub use selector::{RemoveMode, Selector};
pub use store::{Archive, ArchiveOptions};
