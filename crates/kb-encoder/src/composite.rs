//! Composite encoder for multi-part keys ("Entity / Aspect" headings)
//!
//! Splits input on a separator, encodes each part with the base encoder and
//! sums the part vectors elementwise. Training sees the parts, never the
//! composite string, so `encode(a + sep + b) == encode(a) + encode(b)`.

use tracing::instrument;

use crate::encoder::HashingEncoder;
use crate::error::EncoderError;
use crate::report::BuildReporter;
use crate::traits::{TextEncoder, TrainingParams, TrainingSummary};

pub const DEFAULT_SEPARATOR: &str = " / ";

#[derive(Debug, Clone)]
pub struct CompositeEncoder {
    base: HashingEncoder,
    separator: String,
}

impl CompositeEncoder {
    pub fn new(base: HashingEncoder, separator: impl Into<String>) -> Result<Self, EncoderError> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(EncoderError::InvalidConfiguration(
                "composite separator must not be empty".to_string(),
            ));
        }
        Ok(Self { base, separator })
    }

    pub fn base(&self) -> &HashingEncoder {
        &self.base
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Parts of a composite key, in order
    pub fn split<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        text.split(self.separator.as_str())
    }
}

impl TextEncoder for CompositeEncoder {
    fn dimensions(&self) -> usize {
        self.base.dimensions()
    }

    fn is_ready(&self) -> bool {
        self.base.is_ready()
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EncoderError> {
        let mut vector = vec![0.0f32; self.base.dimensions()];
        for part in self.split(text) {
            self.base.accumulate(part, &mut vector)?;
        }
        Ok(vector)
    }

    #[instrument(skip_all, fields(documents = corpus.len(), separator = %self.separator))]
    fn train(
        &mut self,
        corpus: &[String],
        params: &TrainingParams,
        reporter: &mut dyn BuildReporter,
    ) -> Result<TrainingSummary, EncoderError> {
        let parts: Vec<&str> = corpus
            .iter()
            .flat_map(|doc| doc.split(self.separator.as_str()))
            .collect();

        let count = parts.len();
        self.base.train_documents(parts, count, params, reporter)
    }
}
