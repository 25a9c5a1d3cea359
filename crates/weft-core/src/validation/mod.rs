//! Credential/model validation with an explicit cache.

mod cache;
mod catalog;
mod validator;

pub use cache::ValidationCache;
pub use catalog::{DEFAULT_MODELS, ModelCatalog};
pub use validator::{
    API_KEY_PREFIX, CredentialValidator, LivenessProbe, MIN_API_KEY_LEN, check_key_format,
};
