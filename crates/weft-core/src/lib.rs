//! Domain layer of the Weft archive: record types, value equality, ordering,
//! errors, credential validation and the generator collaborator interface.

pub mod error;
pub mod generation;
pub mod record;
pub mod validation;

// Re-export common types
pub use error::{Result, WeftError};
pub use generation::{AttachmentMetadata, GenerationRequest, GenerationResult, Generator, ResponseSchema};
pub use record::{BotDefinition, ChatSession, ChatTurn, ConfigRecord, Message, MessageRole, StoredObject};
pub use validation::{CredentialValidator, LivenessProbe, ModelCatalog, ValidationCache};
