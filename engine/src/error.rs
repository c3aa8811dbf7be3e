//! Error types for the tome engine.

use crate::config::ConfigError;
use crate::{CollectionName, ModelName};
use thiserror::Error;

/// All possible errors from the tome engine.
///
/// Field path resolution and predicate evaluation never produce errors:
/// absence and kind mismatches are ordinary non-matches.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Registry errors
    #[error("model already registered: {0}")]
    DuplicateModel(ModelName),

    #[error("invalid shape for model '{model}': {reason}")]
    InvalidShape { model: ModelName, reason: String },

    #[error("model not found: {0}")]
    ModelNotFound(ModelName),

    // Record errors
    #[error("record not found: {collection}/{id}")]
    NotFound { collection: CollectionName, id: String },

    #[error("record already exists: {collection}/{id}")]
    AlreadyExists { collection: CollectionName, id: String },

    #[error("record in '{0}' has no identity assigned")]
    IdentityUnassigned(CollectionName),

    #[error("stored record {id} does not fit model '{model}': {reason}")]
    DecodeMismatch {
        model: ModelName,
        id: String,
        reason: String,
    },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    // Lifecycle errors
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("store is closed")]
    Closed,

    #[error("storage failure: {0}")]
    StorageFailure(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
