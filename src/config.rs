//! Linker configuration
//!
//! Loaded from YAML. Every section and field has a default, so an empty file
//! is a valid configuration:
//!
//! ```yaml
//! encoder:
//!   dimensions: 512
//!   num_hashes: 4
//!   preprocessor: entity      # words | entity | aspect
//!   language: english
//! index:
//!   metric: cosine            # cosine | inverse_euclidean
//!   allow_partial_failure: false
//! knowledge_base:
//!   oversampling: 10
//!   min_similarity: 0.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use kb_encoder::EncoderSettings;
use kb_vector_index::IndexSettings;

use crate::error::KbError;

/// Default alias oversampling factor for entity-level top-k
pub const DEFAULT_OVERSAMPLING: usize = 10;

/// `knowledge_base:` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KbSettings {
    /// Alias hits fetched per requested entity before deduplication
    pub oversampling: usize,
    /// Candidates must score strictly above this
    pub min_similarity: f32,
}

impl Default for KbSettings {
    fn default() -> Self {
        Self {
            oversampling: DEFAULT_OVERSAMPLING,
            min_similarity: 0.0,
        }
    }
}

impl KbSettings {
    pub fn validate(&self) -> Result<(), KbError> {
        if self.oversampling == 0 {
            return Err(KbError::InvalidConfiguration(
                "knowledge_base.oversampling must be at least 1".to_string(),
            ));
        }
        if !self.min_similarity.is_finite() {
            return Err(KbError::InvalidConfiguration(
                "knowledge_base.min_similarity must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete linker configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkerConfig {
    pub encoder: EncoderSettings,
    pub index: IndexSettings,
    pub knowledge_base: KbSettings,
}

impl LinkerConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, KbError> {
        let config: LinkerConfig = serde_yaml::from_str(content)
            .map_err(|e| KbError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), KbError> {
        self.encoder.validate()?;
        self.knowledge_base.validate()
    }
}
