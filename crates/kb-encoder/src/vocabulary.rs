//! Frequency-pruned feature vocabulary
//!
//! The vocabulary is the only trained state of a hashing encoder. Features
//! outside it contribute nothing to an encoded vector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::normalize::Language;
use crate::preprocess::Preprocessor;
use crate::traits::TrainingParams;

/// Retained features with their training-corpus frequencies
///
/// `BTreeMap` keeps serialized models byte-stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    language: Language,
    min_token_length: usize,
    features: BTreeMap<String, u32>,
}

impl Vocabulary {
    /// Count features over `documents` and keep those reaching
    /// `params.min_frequency`.
    ///
    /// The two thresholds act at different levels. `min_token_length` drops
    /// whole words before feature extraction, while `min_frequency` prunes
    /// individual features after counting. Under the entity preprocessor a
    /// word seen too rarely loses its whole-word feature but still
    /// contributes through any n-grams it shares with more frequent words.
    ///
    /// Returns the vocabulary and the number of distinct features seen
    /// before pruning.
    pub fn train<'a, I>(
        documents: I,
        preprocessor: &Preprocessor,
        params: &TrainingParams,
    ) -> (Self, usize)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();

        for document in documents {
            for feature in
                preprocessor.features(document, params.language, params.min_token_length)
            {
                *counts.entry(feature).or_insert(0) += 1;
            }
        }

        let distinct = counts.len();
        counts.retain(|_, count| *count >= params.min_frequency);

        (
            Self {
                language: params.language,
                min_token_length: params.min_token_length,
                features: counts,
            },
            distinct,
        )
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.features.contains_key(feature)
    }

    pub fn frequency(&self, feature: &str) -> Option<u32> {
        self.features.get(feature).copied()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn min_token_length(&self) -> usize {
        self.min_token_length
    }

    pub fn features(&self) -> impl Iterator<Item = (&str, u32)> {
        self.features.iter().map(|(f, c)| (f.as_str(), *c))
    }
}
