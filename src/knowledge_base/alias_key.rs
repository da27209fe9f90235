//! Alias keys: one indexed vector per (entity, alias ordinal)

use std::fmt;
use std::str::FromStr;

use crate::error::KbError;

/// Identifies one alias of one entity
///
/// Rendered as `"<entity id>.<ordinal>"` at the vector index boundary.
/// Parsing splits at the last `.`, so entity ids may themselves contain dots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AliasKey {
    pub entity_id: String,
    /// Zero-based position in the entity's alias list
    pub ordinal: usize,
}

impl AliasKey {
    pub fn new(entity_id: impl Into<String>, ordinal: usize) -> Self {
        Self {
            entity_id: entity_id.into(),
            ordinal,
        }
    }
}

impl fmt::Display for AliasKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity_id, self.ordinal)
    }
}

impl FromStr for AliasKey {
    type Err = KbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (entity_id, ordinal) = s
            .rsplit_once('.')
            .ok_or_else(|| KbError::InvalidAliasKey(s.to_string()))?;

        if entity_id.is_empty() {
            return Err(KbError::InvalidAliasKey(s.to_string()));
        }
        let ordinal = ordinal
            .parse::<usize>()
            .map_err(|_| KbError::InvalidAliasKey(s.to_string()))?;

        Ok(Self::new(entity_id, ordinal))
    }
}
