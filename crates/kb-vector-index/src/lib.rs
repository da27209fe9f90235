//! Vector Index - exact k-nearest-neighbour search over alias vectors
//!
//! Stores `(key, vector)` pairs produced by a [`kb_encoder::TextEncoder`]
//! and answers top-k similarity queries with reproducible ordering.
//!
//! # Lifecycle
//!
//! ```text
//! build_key_index(keys)          optional: fix the valid keys, one slot each
//!         │
//!         ▼
//! encode_and_build(entries)      full rebuild: encode in parallel, swap in
//!         │
//!         ▼
//! find(query, k)                 read-only, safe from many threads
//! ```
//!
//! The metric is fixed per index instance ([`Metric`]). Ties in similarity
//! are broken by slot order, i.e. the order keys were first registered.

pub mod error;
pub mod index;
pub mod keys;
pub mod metric;

pub use error::IndexError;
pub use index::{BuildSummary, IndexEntry, IndexSettings, SkippedEntry, VectorIndex};
pub use keys::KeyIndex;
pub use metric::{cosine_similarity, dot, euclidean_distance, l2_norm, Metric};
