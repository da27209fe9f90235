//! Encoder settings as they appear in configuration files

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::composite::{CompositeEncoder, DEFAULT_SEPARATOR};
use crate::encoder::{EncoderConfig, HashingEncoder};
use crate::error::EncoderError;
use crate::normalize::Language;
use crate::preprocess::Preprocessor;
use crate::traits::{TextEncoder, TrainingParams};

/// Encoding strategy selected by name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessorKind {
    Words,
    #[default]
    Entity,
    /// Composite "Entity / Aspect" keys over the entity preprocessor
    Aspect,
}

impl FromStr for PreprocessorKind {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "words" => Ok(PreprocessorKind::Words),
            "entity" => Ok(PreprocessorKind::Entity),
            "aspect" => Ok(PreprocessorKind::Aspect),
            other => Err(EncoderError::InvalidConfiguration(format!(
                "unknown encoding strategy '{}' (expected words, entity or aspect)",
                other
            ))),
        }
    }
}

impl fmt::Display for PreprocessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PreprocessorKind::Words => "words",
            PreprocessorKind::Entity => "entity",
            PreprocessorKind::Aspect => "aspect",
        };
        f.write_str(name)
    }
}

/// `encoder:` section of the linker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderSettings {
    pub dimensions: usize,
    pub num_hashes: usize,
    pub preprocessor: PreprocessorKind,
    /// Character n-gram width for entity/aspect preprocessing
    pub ngram: usize,
    /// Part separator for aspect preprocessing
    pub separator: String,
    pub language: Language,
    pub min_frequency: u32,
    pub min_token_length: usize,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        let config = EncoderConfig::default();
        let training = TrainingParams::default();
        Self {
            dimensions: config.dimensions,
            num_hashes: config.num_hashes,
            preprocessor: PreprocessorKind::default(),
            ngram: 3,
            separator: DEFAULT_SEPARATOR.to_string(),
            language: training.language,
            min_frequency: training.min_frequency,
            min_token_length: training.min_token_length,
        }
    }
}

impl EncoderSettings {
    pub fn encoder_config(&self) -> EncoderConfig {
        let preprocessor = match self.preprocessor {
            PreprocessorKind::Words => Preprocessor::Words,
            PreprocessorKind::Entity | PreprocessorKind::Aspect => {
                Preprocessor::Entity { ngram: self.ngram }
            }
        };
        EncoderConfig {
            dimensions: self.dimensions,
            num_hashes: self.num_hashes,
            preprocessor,
        }
    }

    pub fn training_params(&self) -> TrainingParams {
        TrainingParams {
            min_frequency: self.min_frequency,
            min_token_length: self.min_token_length,
            language: self.language,
        }
    }

    pub fn validate(&self) -> Result<(), EncoderError> {
        self.encoder_config().validate()?;
        self.training_params().validate()?;
        if self.preprocessor == PreprocessorKind::Aspect && self.separator.is_empty() {
            return Err(EncoderError::InvalidConfiguration(
                "aspect preprocessing requires a non-empty separator".to_string(),
            ));
        }
        Ok(())
    }
}

/// Construct the untrained encoder described by `settings`
pub fn build_encoder(settings: &EncoderSettings) -> Result<Box<dyn TextEncoder>, EncoderError> {
    settings.validate()?;
    let base = HashingEncoder::new(settings.encoder_config())?;

    match settings.preprocessor {
        PreprocessorKind::Aspect => Ok(Box::new(CompositeEncoder::new(
            base,
            settings.separator.clone(),
        )?)),
        PreprocessorKind::Words | PreprocessorKind::Entity => Ok(Box::new(base)),
    }
}
