//! Core encoder trait and training types
//!
//! `TextEncoder` is the seam between the knowledge base / vector index and
//! the concrete encoders ([`crate::HashingEncoder`], [`crate::CompositeEncoder`]).

use serde::{Deserialize, Serialize};

use crate::error::EncoderError;
use crate::normalize::Language;
use crate::report::BuildReporter;

/// Vocabulary pruning parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Keep features seen at least this many times
    pub min_frequency: u32,
    /// Discard words shorter than this many characters
    pub min_token_length: usize,
    /// Selects tokenization rules
    pub language: Language,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            min_frequency: 1,
            min_token_length: 1,
            language: Language::English,
        }
    }
}

impl TrainingParams {
    pub fn validate(&self) -> Result<(), EncoderError> {
        if self.min_frequency == 0 {
            return Err(EncoderError::InvalidConfiguration(
                "min_frequency must be a positive integer".to_string(),
            ));
        }
        if self.min_token_length == 0 {
            return Err(EncoderError::InvalidConfiguration(
                "min_token_length must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a training run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSummary {
    pub documents: usize,
    pub distinct_features: usize,
    pub kept_features: usize,
}

impl TrainingSummary {
    pub fn discarded_features(&self) -> usize {
        self.distinct_features - self.kept_features
    }
}

/// Deterministic text → vector encoder
///
/// Implementations must be Send + Sync so a trained encoder can serve
/// concurrent queries and parallel bulk encoding.
pub trait TextEncoder: Send + Sync {
    /// Width of every vector this encoder produces
    fn dimensions(&self) -> usize;

    /// Whether a vocabulary has been trained or loaded
    fn is_ready(&self) -> bool;

    /// Encode `text` into a vector of [`TextEncoder::dimensions`] width.
    ///
    /// Fails only with [`EncoderError::ModelNotLoaded`]; unseen input yields
    /// an all-zero vector.
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncoderError>;

    /// Fix the vocabulary from `corpus`, replacing any previous one.
    fn train(
        &mut self,
        corpus: &[String],
        params: &TrainingParams,
        reporter: &mut dyn BuildReporter,
    ) -> Result<TrainingSummary, EncoderError>;
}
