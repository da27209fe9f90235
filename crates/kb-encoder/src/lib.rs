//! Hashing Encoder for Entity Aliases
//!
//! Turns short mention strings ("Aspirin", "Berlin") into fixed-width
//! numeric vectors that can be compared with cosine similarity.
//!
//! # Architecture
//!
//! ```text
//! Alias / Mention
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  Tokenizer (NFKC, lowercase, stopwords) │
//! │  "2-Acetoxybenzoic acid" → [2, acid..]  │
//! └─────────────────────────────────────────┘
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  Preprocessor (words | entity n-grams)  │
//! │  "acid" → <acid>, <ac, aci, cid, id>    │
//! └─────────────────────────────────────────┘
//!       │
//!       ├─── not in trained vocabulary ───► dropped
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  BLAKE3 bucket hashing                  │
//! │  feature → num_hashes buckets (+1.0)    │
//! └─────────────────────────────────────────┘
//!       │
//!       ▼
//!   Vec<f32> of `dimensions` width
//! ```
//!
//! Training only decides which features are kept (vocabulary pruning by
//! frequency and token length). There are no learned weights.

pub mod composite;
pub mod config;
pub mod encoder;
pub mod error;
pub mod model;
pub mod normalize;
pub mod preprocess;
pub mod report;
pub mod traits;
pub mod vocabulary;

pub use composite::{CompositeEncoder, DEFAULT_SEPARATOR};
pub use config::{build_encoder, EncoderSettings, PreprocessorKind};
pub use encoder::{EncoderConfig, HashingEncoder, MAX_HASHES};
pub use error::EncoderError;
pub use model::{EncoderModel, MODEL_VERSION};
pub use normalize::{normalize_text, tokenize, Language};
pub use preprocess::Preprocessor;
pub use report::{BuildEvent, BuildReporter, CollectingReporter, NoopReporter, TracingReporter};
pub use traits::{TextEncoder, TrainingParams, TrainingSummary};
pub use vocabulary::Vocabulary;
