//! Encoder model persistence
//!
//! A trained encoder is fully described by its config, its vocabulary and
//! (for composite encoders) the separator. Models are serialized with
//! bincode and carry a format version.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::composite::CompositeEncoder;
use crate::encoder::{EncoderConfig, HashingEncoder};
use crate::error::EncoderError;
use crate::traits::TextEncoder;
use crate::vocabulary::Vocabulary;

/// Model format version - increment when struct layout changes
pub const MODEL_VERSION: u32 = 1;

/// Serializable encoder state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderModel {
    /// Format version for bincode compatibility
    pub version: u32,
    pub config: EncoderConfig,
    pub vocabulary: Vocabulary,
    /// Present for composite encoders
    pub separator: Option<String>,
}

impl EncoderModel {
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncoderError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncoderError> {
        let model: Self = bincode::deserialize(bytes)?;

        if model.version != MODEL_VERSION {
            return Err(EncoderError::ModelVersion {
                expected: MODEL_VERSION,
                found: model.version,
            });
        }

        Ok(model)
    }

    /// Save model to disk
    pub fn save(&self, path: &Path) -> Result<(), EncoderError> {
        let io_err = |source| EncoderError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_bytes()?).map_err(io_err)?;

        info!(
            "Saved encoder model to {} ({} features)",
            path.display(),
            self.vocabulary.len()
        );
        Ok(())
    }

    /// Load model from disk
    pub fn load(path: &Path) -> Result<Self, EncoderError> {
        let bytes = std::fs::read(path).map_err(|source| EncoderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Rebuild the ready-to-use encoder this model describes
    pub fn into_encoder(self) -> Result<Box<dyn TextEncoder>, EncoderError> {
        let base = HashingEncoder::with_vocabulary(self.config, self.vocabulary)?;
        match self.separator {
            Some(separator) => Ok(Box::new(CompositeEncoder::new(base, separator)?)),
            None => Ok(Box::new(base)),
        }
    }
}

impl HashingEncoder {
    /// Snapshot the trained state; fails if the encoder was never trained
    pub fn to_model(&self) -> Result<EncoderModel, EncoderError> {
        let vocabulary = self.vocabulary().ok_or(EncoderError::ModelNotLoaded)?;
        Ok(EncoderModel {
            version: MODEL_VERSION,
            config: self.config().clone(),
            vocabulary: vocabulary.clone(),
            separator: None,
        })
    }

    pub fn from_model(model: EncoderModel) -> Result<Self, EncoderError> {
        Self::with_vocabulary(model.config, model.vocabulary)
    }
}

impl CompositeEncoder {
    pub fn to_model(&self) -> Result<EncoderModel, EncoderError> {
        let mut model = self.base().to_model()?;
        model.separator = Some(self.separator().to_string());
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::DEFAULT_SEPARATOR;
    use crate::report::NoopReporter;
    use crate::traits::TrainingParams;

    fn trained() -> HashingEncoder {
        let mut encoder = HashingEncoder::new(EncoderConfig::default()).unwrap();
        let corpus: Vec<String> = ["acetaminophen", "Paracetamol", "aspirin", "ASA"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        encoder
            .train(&corpus, &TrainingParams::default(), &mut NoopReporter)
            .unwrap();
        encoder
    }

    #[test]
    fn test_untrained_model_rejected() {
        let encoder = HashingEncoder::new(EncoderConfig::default()).unwrap();
        assert!(matches!(
            encoder.to_model(),
            Err(EncoderError::ModelNotLoaded)
        ));
    }

    #[test]
    fn test_bytes_round_trip_reproduces_vectors() {
        let encoder = trained();
        let bytes = encoder.to_model().unwrap().to_bytes().unwrap();
        let restored = HashingEncoder::from_model(EncoderModel::from_bytes(&bytes).unwrap()).unwrap();

        for text in ["Paracetamol", "ASA", "unknown words", ""] {
            assert_eq!(encoder.encode(text).unwrap(), restored.encode(text).unwrap());
        }
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("encoder.bin");

        let encoder = trained();
        encoder.to_model().unwrap().save(&path).unwrap();

        let restored = EncoderModel::load(&path).unwrap().into_encoder().unwrap();
        assert!(restored.is_ready());
        assert_eq!(
            encoder.encode("aspirin").unwrap(),
            restored.encode("aspirin").unwrap()
        );
    }

    #[test]
    fn test_composite_round_trip_keeps_separator() {
        let composite = CompositeEncoder::new(trained(), DEFAULT_SEPARATOR).unwrap();
        let model = composite.to_model().unwrap();
        assert_eq!(model.separator.as_deref(), Some(DEFAULT_SEPARATOR));

        let restored = model.into_encoder().unwrap();
        assert_eq!(
            composite.encode("aspirin / Paracetamol").unwrap(),
            restored.encode("aspirin / Paracetamol").unwrap()
        );
    }

    #[test]
    fn test_version_mismatch() {
        let mut model = trained().to_model().unwrap();
        model.version = MODEL_VERSION + 1;
        let bytes = bincode::serialize(&model).unwrap();

        assert!(matches!(
            EncoderModel::from_bytes(&bytes),
            Err(EncoderError::ModelVersion { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EncoderModel::load(&dir.path().join("missing.bin")).unwrap_err();
        assert!(err.to_string().contains("missing.bin"));
    }
}
