//! Text normalization and tokenization for alias hashing
//!
//! Provides the tokenization rules the encoder hashes over:
//! - Unicode NFKC normalization
//! - Lowercase conversion
//! - Punctuation stripping (digits are kept)
//! - Whitespace collapsing
//! - Per-language stopword removal

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

use crate::error::EncoderError;

const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "an", "and", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with",
];

const GERMAN_STOPWORDS: &[&str] = &[
    "der", "die", "das", "den", "dem", "des", "ein", "eine", "und", "oder", "von", "zu", "mit",
    "im", "am",
];

const FRENCH_STOPWORDS: &[&str] = &[
    "le", "la", "les", "l", "un", "une", "de", "du", "des", "d", "et", "ou", "au", "aux", "en",
];

const SPANISH_STOPWORDS: &[&str] = &[
    "el", "la", "los", "las", "un", "una", "de", "del", "y", "o", "en", "al",
];

/// Language tag selecting tokenization rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    German,
    French,
    Spanish,
    /// No stopword removal
    #[serde(rename = "none")]
    Unspecified,
}

impl Language {
    fn stopwords(self) -> &'static [&'static str] {
        match self {
            Language::English => ENGLISH_STOPWORDS,
            Language::German => GERMAN_STOPWORDS,
            Language::French => FRENCH_STOPWORDS,
            Language::Spanish => SPANISH_STOPWORDS,
            Language::Unspecified => &[],
        }
    }

    /// Check if a normalized token is a stopword in this language
    pub fn is_stopword(self, token: &str) -> bool {
        self.stopwords().contains(&token)
    }
}

impl FromStr for Language {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "de" | "german" => Ok(Language::German),
            "fr" | "french" => Ok(Language::French),
            "es" | "spanish" => Ok(Language::Spanish),
            "none" | "" => Ok(Language::Unspecified),
            other => Err(EncoderError::InvalidConfiguration(format!(
                "unsupported language '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Language::English => "english",
            Language::German => "german",
            Language::French => "french",
            Language::Spanish => "spanish",
            Language::Unspecified => "none",
        };
        f.write_str(tag)
    }
}

/// Normalize text for hashing.
///
/// # Examples
///
/// ```
/// use kb_encoder::normalize_text;
///
/// assert_eq!(normalize_text("2-Acetoxybenzoic acid"), "2 acetoxybenzoic acid");
/// assert_eq!(normalize_text("  Paracetamol  "), "paracetamol");
/// ```
pub fn normalize_text(s: &str) -> String {
    let folded: String = s.nfkc().collect();

    // Replace non-alphanumeric with space, lowercase
    let mut stripped = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c.is_alphanumeric() {
            stripped.extend(c.to_lowercase());
        } else {
            stripped.push(' ');
        }
    }

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokenize text into normalized words, dropping stopwords of `language`.
pub fn tokenize(s: &str, language: Language) -> Vec<String> {
    normalize_text(s)
        .split_whitespace()
        .filter(|t| !language.is_stopword(t))
        .map(|t| t.to_string())
        .collect()
}
