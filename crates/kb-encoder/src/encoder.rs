//! Vocabulary-bounded hashing encoder
//!
//! Each retained feature is hashed once with BLAKE3. The 32-byte digest is
//! cut into little-endian u32 words; the first `num_hashes` words each pick
//! a bucket (`word % dimensions`) that is incremented by 1.0.
//!
//! Collisions between features are accepted: they trade a little accuracy
//! for a fixed vector width. Output is never normalized, so vectors of
//! composite inputs can be summed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::EncoderError;
use crate::preprocess::Preprocessor;
use crate::report::{BuildEvent, BuildReporter};
use crate::traits::{TextEncoder, TrainingParams, TrainingSummary};
use crate::vocabulary::Vocabulary;

/// Bucket indexes available from one BLAKE3 digest
pub const MAX_HASHES: usize = 8;

/// Static encoder shape, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Vector width
    pub dimensions: usize,
    /// Buckets set per feature (1..=8)
    pub num_hashes: usize,
    pub preprocessor: Preprocessor,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            dimensions: 512,
            num_hashes: 4,
            preprocessor: Preprocessor::default(),
        }
    }
}

impl EncoderConfig {
    pub fn validate(&self) -> Result<(), EncoderError> {
        if self.dimensions == 0 {
            return Err(EncoderError::InvalidConfiguration(
                "dimensions must be at least 1".to_string(),
            ));
        }
        if self.num_hashes == 0 || self.num_hashes > MAX_HASHES {
            return Err(EncoderError::InvalidConfiguration(format!(
                "num_hashes must be between 1 and {}, got {}",
                MAX_HASHES, self.num_hashes
            )));
        }
        self.preprocessor.validate()
    }
}

/// Hashing encoder parameterized by a [`Preprocessor`] strategy
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    config: EncoderConfig,
    /// None until trained or loaded
    vocabulary: Option<Vocabulary>,
}

impl HashingEncoder {
    /// Create an untrained encoder, validating the configuration up front
    pub fn new(config: EncoderConfig) -> Result<Self, EncoderError> {
        config.validate()?;
        Ok(Self {
            config,
            vocabulary: None,
        })
    }

    /// Rebuild a ready encoder from its parts (model load path)
    pub fn with_vocabulary(
        config: EncoderConfig,
        vocabulary: Vocabulary,
    ) -> Result<Self, EncoderError> {
        config.validate()?;
        Ok(Self {
            config,
            vocabulary: Some(vocabulary),
        })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.as_ref().map(Vocabulary::len).unwrap_or(0)
    }

    pub fn contains_feature(&self, feature: &str) -> bool {
        self.vocabulary
            .as_ref()
            .map(|v| v.contains(feature))
            .unwrap_or(false)
    }

    /// Bucket indexes for one feature, independent of the vocabulary
    pub fn buckets(&self, feature: &str) -> impl Iterator<Item = usize> {
        let digest = blake3::hash(feature.as_bytes());
        let bytes = *digest.as_bytes();
        let dimensions = self.config.dimensions;

        (0..self.config.num_hashes).map(move |i| {
            let word = u32::from_le_bytes([
                bytes[4 * i],
                bytes[4 * i + 1],
                bytes[4 * i + 2],
                bytes[4 * i + 3],
            ]);
            word as usize % dimensions
        })
    }

    /// Add the features of `text` into `acc` (must be `dimensions` wide)
    pub(crate) fn accumulate(&self, text: &str, acc: &mut [f32]) -> Result<(), EncoderError> {
        let vocabulary = self
            .vocabulary
            .as_ref()
            .ok_or(EncoderError::ModelNotLoaded)?;

        let features = self.config.preprocessor.features(
            text,
            vocabulary.language(),
            vocabulary.min_token_length(),
        );

        for feature in features.iter().filter(|f| vocabulary.contains(f)) {
            for bucket in self.buckets(feature) {
                acc[bucket] += 1.0;
            }
        }

        Ok(())
    }

    pub(crate) fn train_documents<'a, I>(
        &mut self,
        documents: I,
        document_count: usize,
        params: &TrainingParams,
        reporter: &mut dyn BuildReporter,
    ) -> Result<TrainingSummary, EncoderError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        params.validate()?;
        reporter.report(&BuildEvent::TrainingStarted {
            documents: document_count,
        });

        let (vocabulary, distinct) =
            Vocabulary::train(documents, &self.config.preprocessor, params);

        let summary = TrainingSummary {
            documents: document_count,
            distinct_features: distinct,
            kept_features: vocabulary.len(),
        };

        reporter.report(&BuildEvent::VocabularyFixed {
            kept: summary.kept_features,
            discarded: summary.discarded_features(),
        });
        info!(
            "Encoder trained on {} documents: kept {} of {} features",
            summary.documents, summary.kept_features, summary.distinct_features
        );

        self.vocabulary = Some(vocabulary);
        Ok(summary)
    }
}

impl TextEncoder for HashingEncoder {
    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn is_ready(&self) -> bool {
        self.vocabulary.is_some()
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EncoderError> {
        let mut vector = vec![0.0f32; self.config.dimensions];
        self.accumulate(text, &mut vector)?;
        Ok(vector)
    }

    #[instrument(skip_all, fields(documents = corpus.len()))]
    fn train(
        &mut self,
        corpus: &[String],
        params: &TrainingParams,
        reporter: &mut dyn BuildReporter,
    ) -> Result<TrainingSummary, EncoderError> {
        debug!(?params, "Training hashing encoder");
        self.train_documents(corpus.iter().map(String::as_str), corpus.len(), params, reporter)
    }
}
