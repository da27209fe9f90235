//! Knowledge base layer
//!
//! Owns entity records, flattens them into alias keys for the vector index
//! and collapses alias-level hits back into ranked entity candidates.

mod alias_key;
mod entity;
pub mod ranking;
mod service;

pub use alias_key::AliasKey;
pub use entity::{EntityCandidate, NamedEntity};
pub use ranking::{collapse_by_entity, sort_by_similarity, RankedHit};
pub use service::{KbState, KnowledgeBase};
