//! Entity records and retrieval candidates

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::KbError;

/// A knowledge-base entity with its aliases
///
/// Aliases form an ordered set. The canonical `name` is always the first
/// alias unless it was already listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    /// Unique, stable key (e.g. a Wikidata QID)
    pub id: String,
    /// Canonical display name
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// External system tag → foreign keys, e.g. `"wikidata" → ["Q18216"]`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, Vec<String>>,
}

impl NamedEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let aliases = if name.trim().is_empty() {
            vec![]
        } else {
            vec![name.clone()]
        };
        Self {
            id: id.into(),
            name,
            aliases,
            description: None,
            links: BTreeMap::new(),
        }
    }

    /// Append an alias; duplicates are ignored
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    pub fn with_aliases<I, S>(self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        aliases.into_iter().fold(self, |entity, a| entity.with_alias(a))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_link(mut self, system: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        let keys = self.links.entry(system.into()).or_default();
        let foreign_key = foreign_key.into();
        if !keys.contains(&foreign_key) {
            keys.push(foreign_key);
        }
        self
    }

    /// Foreign keys registered for `system`
    pub fn links_for(&self, system: &str) -> &[String] {
        self.links.get(system).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| a == alias)
    }

    /// Restore the alias-set invariants on a record built by hand or
    /// deserialized: blank and repeated aliases are dropped and the
    /// canonical name is placed first when missing.
    pub fn normalized(mut self) -> Self {
        let mut aliases: Vec<String> = Vec::with_capacity(self.aliases.len() + 1);
        if !self.name.trim().is_empty() && !self.has_alias(&self.name) {
            aliases.push(self.name.clone());
        }
        for alias in self.aliases.drain(..) {
            if !alias.trim().is_empty() && !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }
        self.aliases = aliases;
        self
    }

    /// Fields required for indexing: an id and at least one alias
    pub fn validate(&self) -> Result<(), KbError> {
        if self.id.trim().is_empty() {
            return Err(KbError::InvalidEntity {
                id: self.id.clone(),
                reason: "id must not be empty".to_string(),
            });
        }
        if !self.aliases.iter().any(|a| !a.trim().is_empty()) {
            return Err(KbError::InvalidEntity {
                id: self.id.clone(),
                reason: "at least one non-empty alias is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Entity-level retrieval result
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCandidate {
    pub entity: Arc<NamedEntity>,
    /// Similarity of the best-matching alias
    pub similarity: f32,
    /// 1-based position of that alias in the raw alias-level result stream
    pub rank: usize,
}

impl EntityCandidate {
    pub fn id(&self) -> &str {
        &self.entity.id
    }
}
