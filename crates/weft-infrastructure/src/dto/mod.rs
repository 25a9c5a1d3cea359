//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs are the on-disk shape of archive entries. Record types are
//! mapped field by field; `Message` and `ResponseSchema` are stored as-is.
//!
//! ## Schema Versioning
//!
//! The archive envelope carries a semantic version:
//! - **MAJOR**: breaking changes, refused on read
//! - **MINOR**: backward-compatible additions (new optional fields)
//!
//! ### Archive Version History
//! - **1.0.0**: tagged entries (`kind` = `config` | `bot` | `chat`)

mod archive;

pub use archive::{
    ARCHIVE_SCHEMA_VERSION, BotDefinitionDto, ChatSessionDto, ConfigRecordDto, KNOWN_KINDS,
    StoredObjectDto,
};
