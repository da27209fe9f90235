//! Knowledge base: entity catalog plus alias-vector retrieval

use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use kb_encoder::{build_encoder, BuildReporter, EncoderError, TextEncoder, TrainingParams, TrainingSummary};
use kb_vector_index::{l2_norm, BuildSummary, IndexSettings, VectorIndex};

use super::alias_key::AliasKey;
use super::entity::{EntityCandidate, NamedEntity};
use super::ranking::collapse_by_entity;
use crate::config::{KbSettings, LinkerConfig};
use crate::error::KbError;

/// Lifecycle of a [`KnowledgeBase`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KbState {
    /// No entities registered
    Empty,
    /// Entities registered since the last build (or never built)
    Populated,
    /// Index reflects every registered entity
    Indexed,
}

/// Entity catalog with nearest-alias candidate retrieval
///
/// Populate with [`KnowledgeBase::add_entity`], train the encoder on the
/// alias corpus, call [`KnowledgeBase::build_index`] once, then share the
/// instance read-only: queries take `&self` and may run concurrently.
pub struct KnowledgeBase {
    settings: KbSettings,
    training: TrainingParams,
    encoder: Box<dyn TextEncoder>,
    index: VectorIndex,
    /// Insertion order; overwrites keep the original position
    entities: Vec<Arc<NamedEntity>>,
    positions: HashMap<String, usize>,
    state: KbState,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("entities", &self.entities.len())
            .field("indexed_aliases", &self.index.size())
            .field("encoder_ready", &self.encoder.is_ready())
            .field("state", &self.state)
            .finish()
    }
}

impl KnowledgeBase {
    /// Knowledge base with an untrained encoder built from `config`
    pub fn new(config: &LinkerConfig) -> Result<Self, KbError> {
        config.validate()?;
        let encoder = build_encoder(&config.encoder)?;
        let mut kb = Self::with_encoder(
            encoder,
            config.index.clone(),
            config.knowledge_base.clone(),
        )?;
        kb.training = config.encoder.training_params();
        Ok(kb)
    }

    /// Knowledge base over an existing (e.g. loaded) encoder
    pub fn with_encoder(
        encoder: Box<dyn TextEncoder>,
        index: IndexSettings,
        settings: KbSettings,
    ) -> Result<Self, KbError> {
        settings.validate()?;
        Ok(Self {
            settings,
            training: TrainingParams::default(),
            index: VectorIndex::new(encoder.dimensions(), index),
            encoder,
            entities: Vec::new(),
            positions: HashMap::new(),
            state: KbState::Empty,
        })
    }

    pub fn state(&self) -> KbState {
        self.state
    }

    pub fn settings(&self) -> &KbSettings {
        &self.settings
    }

    /// Training parameters taken from the configuration
    pub fn training_params(&self) -> &TrainingParams {
        &self.training
    }

    pub fn encoder(&self) -> &dyn TextEncoder {
        self.encoder.as_ref()
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Insert or overwrite an entity by id.
    ///
    /// The record is normalized first (see [`NamedEntity::normalized`]).
    /// Aliases shared with other entities are allowed. The current index
    /// keeps serving until the next [`KnowledgeBase::build_index`].
    pub fn add_entity(&mut self, entity: NamedEntity) -> Result<(), KbError> {
        let entity = entity.normalized();
        entity.validate()?;

        match self.positions.get(&entity.id) {
            Some(&position) => {
                debug!(id = %entity.id, "Overwriting entity");
                self.entities[position] = Arc::new(entity);
            }
            None => {
                self.positions.insert(entity.id.clone(), self.entities.len());
                self.entities.push(Arc::new(entity));
            }
        }

        self.state = KbState::Populated;
        Ok(())
    }

    /// Add every entity, stopping at the first invalid one
    pub fn add_entities<I>(&mut self, entities: I) -> Result<usize, KbError>
    where
        I: IntoIterator<Item = NamedEntity>,
    {
        let mut added = 0;
        for entity in entities {
            self.add_entity(entity)?;
            added += 1;
        }
        Ok(added)
    }

    pub fn get_entity(&self, id: &str) -> Option<&NamedEntity> {
        self.positions
            .get(id)
            .map(|&position| self.entities[position].as_ref())
    }

    /// Entities in insertion order
    pub fn entities(&self) -> impl Iterator<Item = &NamedEntity> {
        self.entities.iter().map(Arc::as_ref)
    }

    pub fn count_entities(&self) -> usize {
        self.entities.len()
    }

    /// Number of aliases across all registered entities
    pub fn count_mentions(&self) -> usize {
        self.entities.iter().map(|e| e.aliases.len()).sum()
    }

    /// Entities linked to `foreign_key` in external `system`
    pub fn entities_linked_to(&self, system: &str, foreign_key: &str) -> Vec<&NamedEntity> {
        self.entities()
            .filter(|e| e.links_for(system).iter().any(|k| k == foreign_key))
            .collect()
    }

    /// Every alias of every entity, in indexing order
    pub fn alias_corpus(&self) -> Vec<String> {
        self.entities
            .iter()
            .flat_map(|e| e.aliases.iter().cloned())
            .collect()
    }

    /// `(alias key, alias text)` pairs: entity insertion order, then alias ordinal
    pub fn alias_entries(&self) -> Vec<(String, String)> {
        self.entities
            .iter()
            .flat_map(|entity| {
                entity
                    .aliases
                    .iter()
                    .enumerate()
                    .map(|(ordinal, alias)| {
                        (AliasKey::new(entity.id.as_str(), ordinal).to_string(), alias.clone())
                    })
            })
            .collect()
    }

    /// Train the encoder on the alias corpus.
    ///
    /// Vectors built by the previous vocabulary are meaningless afterwards,
    /// so the index is cleared.
    pub fn train_encoder(
        &mut self,
        params: &TrainingParams,
        reporter: &mut dyn BuildReporter,
    ) -> Result<TrainingSummary, KbError> {
        let corpus = self.alias_corpus();
        let summary = self.encoder.train(&corpus, params, reporter)?;

        self.index = VectorIndex::new(self.encoder.dimensions(), self.index.settings().clone());
        self.state = if self.entities.is_empty() {
            KbState::Empty
        } else {
            KbState::Populated
        };

        info!(
            aliases = corpus.len(),
            kept = summary.kept_features,
            "Encoder trained on alias corpus"
        );
        Ok(summary)
    }

    /// Rebuild the alias index from every registered entity
    #[instrument(skip_all, fields(entities = self.entities.len()))]
    pub fn build_index(&mut self, reporter: &mut dyn BuildReporter) -> Result<BuildSummary, KbError> {
        if !self.encoder.is_ready() {
            return Err(EncoderError::ModelNotLoaded.into());
        }

        let entries = self.alias_entries();
        let summary = self
            .index
            .encode_and_build(self.encoder.as_ref(), &entries, reporter)?;

        self.state = KbState::Indexed;
        info!(
            entities = self.entities.len(),
            aliases = summary.indexed,
            "Knowledge base indexed"
        );
        Ok(summary)
    }

    /// Up to `k` distinct entities whose aliases are nearest to `mention`.
    ///
    /// Fetches `k * oversampling` alias hits, collapses them per entity and
    /// truncates. Returns an empty list before the first build.
    #[instrument(skip(self), level = "debug")]
    pub fn find_nearest_entities(&self, mention: &str, k: usize) -> Result<Vec<EntityCandidate>, KbError> {
        if k == 0 || self.index.is_empty() {
            return Ok(vec![]);
        }

        let query = self
            .encoder
            .encode(mention)
            .map_err(|source| KbError::MentionEncoding {
                mention: mention.to_string(),
                source,
            })?;

        // No shared features with any alias, whatever the metric would score
        if l2_norm(&query) == 0.0 {
            debug!(mention, "Mention has no known features");
            return Ok(vec![]);
        }

        let hits = self
            .index
            .find(&query, k.saturating_mul(self.settings.oversampling))?;

        let alias_hits = hits
            .into_iter()
            .map(|hit| -> Result<(String, f32), KbError> {
                Ok((hit.key.parse::<AliasKey>()?.entity_id, hit.similarity))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let raw_hits = alias_hits.len();

        let candidates: Vec<EntityCandidate> =
            collapse_by_entity(alias_hits, k, self.settings.min_similarity)
                .into_iter()
                .filter_map(|hit| {
                    let position = *self.positions.get(&hit.entity_id)?;
                    Some(EntityCandidate {
                        entity: Arc::clone(&self.entities[position]),
                        similarity: hit.similarity,
                        rank: hit.rank,
                    })
                })
                .collect();

        debug!(
            raw_hits,
            candidates = candidates.len(),
            "Resolved mention"
        );
        Ok(candidates)
    }

    /// [`KnowledgeBase::find_nearest_entities`] for many mentions in parallel
    pub fn find_nearest_entities_batch<S>(
        &self,
        mentions: &[S],
        k: usize,
    ) -> Result<Vec<Vec<EntityCandidate>>, KbError>
    where
        S: AsRef<str> + Sync,
    {
        mentions
            .par_iter()
            .map(|mention| self.find_nearest_entities(mention.as_ref(), k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_encoder::{BuildEvent, CollectingReporter, NoopReporter};

    fn city_kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new(&LinkerConfig::default()).unwrap();
        kb.add_entity(
            NamedEntity::new("Q64", "Berlin")
                .with_alias("Berlin, Germany")
                .with_link("geonames", "2950159"),
        )
        .unwrap();
        kb.add_entity(NamedEntity::new("Q90", "Paris").with_link("geonames", "2988507"))
            .unwrap();
        kb
    }

    fn indexed_city_kb() -> KnowledgeBase {
        let mut kb = city_kb();
        let params = kb.training_params().clone();
        kb.train_encoder(&params, &mut NoopReporter).unwrap();
        kb.build_index(&mut NoopReporter).unwrap();
        kb
    }

    #[test]
    fn test_state_transitions() {
        let mut kb = KnowledgeBase::new(&LinkerConfig::default()).unwrap();
        assert_eq!(kb.state(), KbState::Empty);

        kb.add_entity(NamedEntity::new("Q64", "Berlin")).unwrap();
        assert_eq!(kb.state(), KbState::Populated);

        let params = kb.training_params().clone();
        kb.train_encoder(&params, &mut NoopReporter).unwrap();
        assert_eq!(kb.state(), KbState::Populated);

        kb.build_index(&mut NoopReporter).unwrap();
        assert_eq!(kb.state(), KbState::Indexed);

        kb.add_entity(NamedEntity::new("Q90", "Paris")).unwrap();
        assert_eq!(kb.state(), KbState::Populated);
        // Last build keeps serving
        assert_eq!(kb.find_nearest_entities("Berlin", 1).unwrap()[0].id(), "Q64");
    }

    #[test]
    fn test_find_before_build_is_empty() {
        let kb = city_kb();
        assert!(kb.find_nearest_entities("Berlin", 5).unwrap().is_empty());
    }

    #[test]
    fn test_build_requires_trained_encoder() {
        let mut kb = city_kb();
        let err = kb.build_index(&mut NoopReporter).unwrap_err();
        assert!(matches!(err, KbError::Encoder(EncoderError::ModelNotLoaded)));
    }

    #[test]
    fn test_training_clears_index() {
        let mut kb = indexed_city_kb();
        assert_eq!(kb.index().size(), 3);

        let params = kb.training_params().clone();
        kb.train_encoder(&params, &mut NoopReporter).unwrap();
        assert_eq!(kb.index().size(), 0);
        assert!(kb.find_nearest_entities("Berlin", 5).unwrap().is_empty());
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut kb = city_kb();
        kb.add_entity(NamedEntity::new("Q64", "Berlin").with_alias("Berlin-Mitte"))
            .unwrap();

        assert_eq!(kb.count_entities(), 2);
        let ids: Vec<&str> = kb.entities().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["Q64", "Q90"]);
        assert!(kb.get_entity("Q64").unwrap().has_alias("Berlin-Mitte"));
    }

    #[test]
    fn test_invalid_entity_rejected() {
        let mut kb = city_kb();
        let err = kb.add_entity(NamedEntity::new("", "Nowhere")).unwrap_err();
        assert!(matches!(err, KbError::InvalidEntity { .. }));
        assert_eq!(kb.count_entities(), 2);
    }

    #[test]
    fn test_alias_entries_order() {
        let kb = city_kb();
        let keys: Vec<String> = kb.alias_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Q64.0", "Q64.1", "Q90.0"]);
        assert_eq!(kb.count_mentions(), 3);
    }

    #[test]
    fn test_entities_linked_to() {
        let kb = city_kb();
        let linked = kb.entities_linked_to("geonames", "2988507");
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, "Q90");
        assert!(kb.entities_linked_to("wikidata", "Q90").is_empty());
    }

    #[test]
    fn test_build_reports_events() {
        let mut kb = city_kb();
        let mut reporter = CollectingReporter::default();
        let params = kb.training_params().clone();
        kb.train_encoder(&params, &mut reporter).unwrap();
        kb.build_index(&mut reporter).unwrap();

        assert!(matches!(
            reporter.events.first(),
            Some(BuildEvent::TrainingStarted { documents: 3 })
        ));
        assert_eq!(
            reporter.events.last(),
            Some(&BuildEvent::IndexBuilt {
                indexed: 3,
                skipped: 0
            })
        );
    }

    #[test]
    fn test_batch_matches_sequential() {
        let kb = indexed_city_kb();
        let mentions = ["Berlin", "paris", "Berlin Germany", "Tokyo"];

        let batch = kb.find_nearest_entities_batch(&mentions[..], 2).unwrap();
        for (mention, result) in mentions.iter().zip(batch) {
            assert_eq!(result, kb.find_nearest_entities(mention, 2).unwrap());
        }
    }

    #[test]
    fn test_oversampling_of_one_can_underfill() {
        let mut config = LinkerConfig::default();
        config.knowledge_base.oversampling = 1;
        let mut kb = KnowledgeBase::new(&config).unwrap();
        kb.add_entity(NamedEntity::new("Q64", "Berlin").with_aliases(["Berlin city", "city of Berlin"]))
            .unwrap();
        kb.add_entity(NamedEntity::new("Q1", "Berlin Township")).unwrap();
        let params = kb.training_params().clone();
        kb.train_encoder(&params, &mut NoopReporter).unwrap();
        kb.build_index(&mut NoopReporter).unwrap();

        // Two alias hits, both owned by Q64
        let found = kb.find_nearest_entities("Berlin", 2).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "Q64");
    }
}
