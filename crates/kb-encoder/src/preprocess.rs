//! Preprocessing strategies: text → hashable features
//!
//! The encoder core is the same for every strategy; only the feature
//! extraction differs.

use serde::{Deserialize, Serialize};

use crate::error::EncoderError;
use crate::normalize::{tokenize, Language};

/// Marks word boundaries inside character n-grams
const WORD_START: char = '<';
const WORD_END: char = '>';

/// Feature extraction strategy injected into [`crate::HashingEncoder`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preprocessor {
    /// One feature per normalized word
    Words,
    /// Whole word plus boundary-marked character n-grams of each word,
    /// so spelling variants ("Paracetamol" / "Paracetanol") share buckets
    Entity { ngram: usize },
}

impl Default for Preprocessor {
    fn default() -> Self {
        Preprocessor::Entity { ngram: 3 }
    }
}

impl Preprocessor {
    pub fn validate(&self) -> Result<(), EncoderError> {
        match self {
            Preprocessor::Words => Ok(()),
            Preprocessor::Entity { ngram } if *ngram == 0 => Err(
                EncoderError::InvalidConfiguration("ngram width must be at least 1".to_string()),
            ),
            Preprocessor::Entity { .. } => Ok(()),
        }
    }

    /// Extract features from `text`.
    ///
    /// Words shorter than `min_token_length` characters are discarded before
    /// any n-gram expansion.
    pub fn features(&self, text: &str, language: Language, min_token_length: usize) -> Vec<String> {
        let words = tokenize(text, language)
            .into_iter()
            .filter(|w| w.chars().count() >= min_token_length);

        match self {
            Preprocessor::Words => words.collect(),
            Preprocessor::Entity { ngram } => {
                let mut features = Vec::new();
                for word in words {
                    push_word_ngrams(&mut features, &word, *ngram);
                }
                features
            }
        }
    }
}

fn push_word_ngrams(features: &mut Vec<String>, word: &str, ngram: usize) {
    let marked: Vec<char> = std::iter::once(WORD_START)
        .chain(word.chars())
        .chain(std::iter::once(WORD_END))
        .collect();

    features.push(marked.iter().collect());

    // Marked word no longer than one n-gram: the whole-word feature covers it
    if marked.len() <= ngram {
        return;
    }

    for window in marked.windows(ngram) {
        features.push(window.iter().collect());
    }
}
