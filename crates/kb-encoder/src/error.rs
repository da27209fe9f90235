//! Encoder error types

/// Errors raised by encoders and their persistence layer
#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    /// `encode` called before `train` or model load
    #[error("Encoder model not loaded: train the encoder or load a saved model first")]
    ModelNotLoaded,

    #[error("Invalid encoder configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Encoder model version mismatch: expected {expected}, found {found}")]
    ModelVersion { expected: u32, found: u32 },

    #[error("Encoder model serialization failed: {0}")]
    Serialization(String),

    #[error("Encoder model I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<bincode::Error> for EncoderError {
    fn from(err: bincode::Error) -> Self {
        EncoderError::Serialization(err.to_string())
    }
}
