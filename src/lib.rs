//! KB Linker - link textual mentions to knowledge-base entities
//!
//! ```text
//! NamedEntity ──► aliases ──► AliasKey "Q18216.2" ─┐
//!                                                  │ HashingEncoder
//!                                                  ▼
//!                                             VectorIndex
//!                                                  ▲
//! mention "Aspirin" ──► HashingEncoder ──► find ───┘
//!                                                  │
//!                                                  ▼
//!                              collapse by entity, top-k ──► EntityCandidate
//! ```
//!
//! The encoder and index live in their own crates (`kb-encoder`,
//! `kb-vector-index`); this crate adds the entity catalog, configuration
//! and candidate ranking.

pub mod config;
pub mod error;
pub mod knowledge_base;

pub use config::{KbSettings, LinkerConfig, DEFAULT_OVERSAMPLING};
pub use error::KbError;
pub use knowledge_base::{AliasKey, EntityCandidate, KbState, KnowledgeBase, NamedEntity};

pub use kb_encoder;
pub use kb_vector_index;
