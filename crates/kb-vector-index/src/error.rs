//! Vector index errors

use kb_encoder::EncoderError;

/// Errors that can occur during index operations
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Duplicate index key '{0}'")]
    DuplicateKey(String),

    #[error("Key '{0}' is not in the registered key index")]
    UnregisteredKey(String),

    #[error("Registered key '{0}' has no entry to encode")]
    MissingEntry(String),

    #[error("Encoding failed for key '{key}' (text {text:?}): {source}")]
    Encoding {
        key: String,
        text: String,
        #[source]
        source: EncoderError,
    },

    #[error("Vector for key '{key}' has {actual} dimensions, index expects {expected}")]
    DimensionMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("Query vector has {actual} dimensions, index expects {expected}")]
    QueryDimensionMismatch { expected: usize, actual: usize },

    #[error("Encoder produces {actual}-dimensional vectors, index expects {expected}")]
    EncoderDimensions { expected: usize, actual: usize },

    #[error("Encoder not ready: train or load a model before building the index")]
    EncoderNotReady,
}
