//! Knowledge base errors

use kb_encoder::EncoderError;
use kb_vector_index::IndexError;

/// Errors that can occur while populating, indexing or querying a knowledge base
#[derive(Debug, thiserror::Error)]
pub enum KbError {
    #[error("Invalid entity '{id}': {reason}")]
    InvalidEntity { id: String, reason: String },

    #[error("Invalid alias key '{0}': expected '<entity id>.<ordinal>'")]
    InvalidAliasKey(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to encode mention {mention:?}: {source}")]
    MentionEncoding {
        mention: String,
        #[source]
        source: EncoderError,
    },

    #[error(transparent)]
    Encoder(#[from] EncoderError),

    #[error(transparent)]
    Index(#[from] IndexError),
}
