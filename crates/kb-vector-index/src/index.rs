//! Exact in-memory vector index
//!
//! Brute-force scan over all stored vectors with precomputed norms. Builds
//! are full rebuilds: new content is assembled off to the side and swapped
//! in only once it is complete, so a failed build never leaves a
//! half-written index behind.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use kb_encoder::{BuildEvent, BuildReporter, EncoderError, TextEncoder};

use crate::error::IndexError;
use crate::keys::KeyIndex;
use crate::metric::{l2_norm, Metric};

/// `index:` section of the linker configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexSettings {
    pub metric: Metric,
    /// Repeated keys: false rejects with `DuplicateKey`, true lets the last
    /// entry's text win while keeping the first slot
    pub allow_duplicates: bool,
    /// Entries that fail to encode: false fails the whole build, true skips
    /// them and reports them in the [`BuildSummary`]
    pub allow_partial_failure: bool,
}

/// A single nearest-neighbour result
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub key: String,
    pub similarity: f32,
}

/// An entry dropped from a partial build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub key: String,
    pub reason: String,
}

/// Outcome of [`VectorIndex::encode_and_build`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub indexed: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Key → vector store answering k-nearest-neighbour queries
///
/// Read-only after a build; `find` takes `&self` and the index is
/// Send + Sync, so a built index can be shared across threads.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimensions: usize,
    settings: IndexSettings,
    /// Set by `build_key_index`; builds are checked against it
    registered: Option<KeyIndex>,
    keys: KeyIndex,
    /// Aligned with `keys` slots after a successful build
    vectors: Vec<Vec<f32>>,
    norms: Vec<f32>,
}

impl VectorIndex {
    pub fn new(dimensions: usize, settings: IndexSettings) -> Self {
        Self {
            dimensions,
            settings,
            registered: None,
            keys: KeyIndex::default(),
            vectors: Vec::new(),
            norms: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn metric(&self) -> Metric {
        self.settings.metric
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    /// Register the set of valid keys for subsequent builds.
    ///
    /// `allow_duplicates` becomes the index's duplicate-key policy for both
    /// registration and later builds. Stored vectors are left in place until
    /// the next successful [`VectorIndex::encode_and_build`]. Returns the
    /// number of distinct keys registered.
    pub fn build_key_index<I, S>(&mut self, keys: I, allow_duplicates: bool) -> Result<usize, IndexError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = KeyIndex::build(keys, allow_duplicates)?;
        let count = keys.len();

        self.settings.allow_duplicates = allow_duplicates;
        self.registered = Some(keys);

        debug!(keys = count, "Key index registered");
        Ok(count)
    }

    /// Drop the registered key set; later builds take their keys from the
    /// entries again.
    pub fn clear_key_index(&mut self) {
        self.registered = None;
    }

    /// Registered keys in slot order, if `build_key_index` has been called
    pub fn registered_keys(&self) -> Option<impl Iterator<Item = &str>> {
        self.registered.as_ref().map(KeyIndex::iter)
    }

    /// Encode every `(key, text)` entry and replace the index content.
    ///
    /// Without a registered key set, keys are taken from `entries` in order.
    /// After [`VectorIndex::build_key_index`], slots follow the registered
    /// order: an entry with an unregistered key fails with `UnregisteredKey`
    /// and a registered key with no entry fails with `MissingEntry`. Strict
    /// builds abort on the first failure, so every registered key ends up
    /// with exactly one vector; partial builds skip and report. On error the
    /// previous content is left untouched.
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub fn encode_and_build(
        &mut self,
        encoder: &dyn TextEncoder,
        entries: &[(String, String)],
        reporter: &mut dyn BuildReporter,
    ) -> Result<BuildSummary, IndexError> {
        if !encoder.is_ready() {
            return Err(IndexError::EncoderNotReady);
        }
        if encoder.dimensions() != self.dimensions {
            return Err(IndexError::EncoderDimensions {
                expected: self.dimensions,
                actual: encoder.dimensions(),
            });
        }

        let entry_keys = KeyIndex::build(
            entries.iter().map(|(key, _)| key.as_str()),
            self.settings.allow_duplicates,
        )?;
        let slots = match &self.registered {
            Some(registered) => registered,
            None => &entry_keys,
        };

        let mut failures: Vec<IndexError> = entry_keys
            .iter()
            .filter(|key| !slots.contains(key))
            .map(|key| IndexError::UnregisteredKey(key.to_string()))
            .collect();

        // One text per slot; with duplicates allowed the last entry wins
        let mut texts: Vec<Option<&str>> = vec![None; slots.len()];
        for (key, text) in entries {
            if let Some(slot) = slots.slot(key) {
                texts[slot] = Some(text.as_str());
            }
        }

        let encoded: Vec<Option<Result<Vec<f32>, EncoderError>>> = texts
            .par_iter()
            .map(|text| text.map(|text| encoder.encode(text)))
            .collect();

        let mut keys = KeyIndex::default();
        let mut vectors = Vec::with_capacity(encoded.len());

        for (slot, result) in encoded.into_iter().enumerate() {
            let key = slots.key(slot).unwrap_or_default().to_string();

            let failure = match result {
                Some(Ok(vector)) if vector.len() == self.dimensions => {
                    keys.register(key, false)?;
                    vectors.push(vector);
                    continue;
                }
                Some(Ok(vector)) => IndexError::DimensionMismatch {
                    key,
                    expected: self.dimensions,
                    actual: vector.len(),
                },
                Some(Err(source)) => IndexError::Encoding {
                    key,
                    text: texts[slot].unwrap_or_default().to_string(),
                    source,
                },
                None => IndexError::MissingEntry(key),
            };
            failures.push(failure);
        }

        for failure in &failures {
            reporter.report(&BuildEvent::EntryFailed {
                key: failed_key(failure).to_string(),
                reason: failure.to_string(),
            });
        }

        if !self.settings.allow_partial_failure && !failures.is_empty() {
            let first = failures.swap_remove(0);
            warn!(error = %first, "Index build aborted; previous content kept");
            return Err(first);
        }

        let skipped: Vec<SkippedEntry> = failures
            .iter()
            .map(|failure| SkippedEntry {
                key: failed_key(failure).to_string(),
                reason: failure.to_string(),
            })
            .collect();

        self.norms = vectors.iter().map(|v| l2_norm(v)).collect();
        self.vectors = vectors;
        self.keys = keys;

        let summary = BuildSummary {
            indexed: self.vectors.len(),
            skipped,
        };

        reporter.report(&BuildEvent::IndexBuilt {
            indexed: summary.indexed,
            skipped: summary.skipped.len(),
        });
        info!(
            "Vector index built: {} vectors, {} skipped",
            summary.indexed,
            summary.skipped.len()
        );

        Ok(summary)
    }

    /// Up to `k` entries by descending similarity to `query`.
    ///
    /// Equal similarities keep slot order. An empty index, `k == 0` or a
    /// query with no direction under the metric yield an empty result.
    pub fn find(&self, query: &[f32], k: usize) -> Result<Vec<IndexEntry>, IndexError> {
        if k == 0 || self.vectors.is_empty() {
            return Ok(vec![]);
        }
        if query.len() != self.dimensions {
            return Err(IndexError::QueryDimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let metric = self.settings.metric;
        let query_norm = l2_norm(query);
        if !metric.accepts_query(query_norm) {
            debug!("Zero query vector, nothing to rank");
            return Ok(vec![]);
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .zip(&self.norms)
            .enumerate()
            .map(|(slot, (vector, norm))| {
                (slot, metric.similarity(query, query_norm, vector, *norm))
            })
            .collect();

        // sort_by is stable: ties stay in slot order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .filter_map(|(slot, similarity)| {
                self.keys.key(slot).map(|key| IndexEntry {
                    key: key.to_string(),
                    similarity,
                })
            })
            .collect())
    }

    /// Count of stored vectors
    pub fn size(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[f32]> {
        self.keys
            .slot(key)
            .and_then(|slot| self.vectors.get(slot))
            .map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Registered keys in slot order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter()
    }
}

fn failed_key(error: &IndexError) -> &str {
    match error {
        IndexError::Encoding { key, .. }
        | IndexError::DimensionMismatch { key, .. }
        | IndexError::UnregisteredKey(key)
        | IndexError::MissingEntry(key) => key,
        _ => "",
    }
}
