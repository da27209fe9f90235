//! Integration tests for the knowledge base
//!
//! Tests verify:
//! 1. Drug knowledge base scenario (counts, best match, unknown mention)
//! 2. Entity-level dedup and top-k bound
//! 3. Rebuild idempotence and shared-alias tie order
//! 4. Encoder model persistence through the knowledge base
//! 5. Aspect (composite) encoding end to end

use kb_linker::kb_encoder::{
    EncoderModel, HashingEncoder, NoopReporter, PreprocessorKind, TextEncoder,
};
use kb_linker::kb_vector_index::Metric;
use kb_linker::{KbState, KnowledgeBase, LinkerConfig, NamedEntity};
use proptest::prelude::*;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn drug_entities() -> Vec<NamedEntity> {
    vec![
        NamedEntity::new("Q57055", "acetaminophen")
            .with_aliases(["Paracetamol", "Acetamol", "Paracetanol"])
            .with_link("wikidata", "Q57055"),
        NamedEntity::new("Q18216", "aspirin")
            .with_aliases(["Aspirin", "ASA", "2-Acetoxybenzoic acid"])
            .with_description("medication used to reduce pain, fever, or inflammation")
            .with_link("wikidata", "Q18216"),
    ]
}

fn trained(config: &LinkerConfig, entities: Vec<NamedEntity>) -> KnowledgeBase {
    let mut kb = KnowledgeBase::new(config).unwrap();
    kb.add_entities(entities).unwrap();
    let params = kb.training_params().clone();
    kb.train_encoder(&params, &mut NoopReporter).unwrap();
    kb
}

fn indexed(entities: Vec<NamedEntity>) -> KnowledgeBase {
    let mut kb = trained(&LinkerConfig::default(), entities);
    kb.build_index(&mut NoopReporter).unwrap();
    kb
}

fn ids(candidates: &[kb_linker::EntityCandidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.id()).collect()
}

// ============================================================================
// SCENARIO
// ============================================================================

#[test]
fn test_drug_scenario_counts() {
    let kb = indexed(drug_entities());
    assert_eq!(kb.state(), KbState::Indexed);
    assert_eq!(kb.count_entities(), 2);
    assert_eq!(kb.count_mentions(), 8);
    assert_eq!(kb.index().size(), 8);
}

#[test]
fn test_drug_scenario_best_match() {
    let kb = indexed(drug_entities());
    let candidates = kb.find_nearest_entities("Aspirin", 10).unwrap();

    assert_eq!(candidates[0].id(), "Q18216");
    assert!(candidates[0].similarity > 0.99);
    assert_eq!(candidates[0].rank, 1);
    assert_eq!(candidates[0].entity.name, "aspirin");

    if let Some(other) = candidates.iter().find(|c| c.id() == "Q57055") {
        assert!(other.similarity <= candidates[0].similarity);
        // Both aspirin aliases outrank every acetaminophen alias
        assert!(other.rank >= 3);
    }
}

#[test]
fn test_unknown_mention_is_empty() {
    let kb = indexed(drug_entities());
    assert!(kb.find_nearest_entities("123456", 10).unwrap().is_empty());
    assert!(kb.find_nearest_entities("", 10).unwrap().is_empty());
}

#[test]
fn test_unknown_mention_is_empty_under_inverse_euclidean() {
    let mut config = LinkerConfig::default();
    config.index.metric = Metric::InverseEuclidean;
    let mut kb = trained(&config, drug_entities());
    kb.build_index(&mut NoopReporter).unwrap();

    assert!(kb.find_nearest_entities("123456", 10).unwrap().is_empty());
    assert!(kb.find_nearest_entities("", 10).unwrap().is_empty());

    let candidates = kb.find_nearest_entities("Aspirin", 10).unwrap();
    assert_eq!(candidates[0].id(), "Q18216");
}

#[test]
fn test_spelling_variant_resolves() {
    let kb = indexed(drug_entities());
    let candidates = kb.find_nearest_entities("paracetamole", 1).unwrap();
    assert_eq!(ids(&candidates), vec!["Q57055"]);
}

#[test]
fn test_entity_appears_once() {
    let kb = indexed(drug_entities());
    let candidates = kb.find_nearest_entities("aspirin", 10).unwrap();
    let aspirin_hits = candidates.iter().filter(|c| c.id() == "Q18216").count();
    assert_eq!(aspirin_hits, 1);
}

#[test]
fn test_empty_knowledge_base() {
    let mut kb = KnowledgeBase::new(&LinkerConfig::default()).unwrap();
    assert_eq!(kb.state(), KbState::Empty);
    assert!(kb.find_nearest_entities("Aspirin", 10).unwrap().is_empty());

    let params = kb.training_params().clone();
    kb.train_encoder(&params, &mut NoopReporter).unwrap();
    kb.build_index(&mut NoopReporter).unwrap();
    assert!(kb.find_nearest_entities("Aspirin", 10).unwrap().is_empty());
}

#[test]
fn test_links_resolve() {
    let kb = indexed(drug_entities());
    let linked = kb.entities_linked_to("wikidata", "Q18216");
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, "Q18216");
}

// ============================================================================
// REBUILD AND TIES
// ============================================================================

#[test]
fn test_rebuild_idempotent() {
    let mut kb = indexed(drug_entities());
    let mentions = ["Aspirin", "Paracetamol", "acid", "ASA"];
    let before: Vec<_> = mentions
        .iter()
        .map(|m| kb.find_nearest_entities(m, 5).unwrap())
        .collect();

    kb.build_index(&mut NoopReporter).unwrap();
    let after: Vec<_> = mentions
        .iter()
        .map(|m| kb.find_nearest_entities(m, 5).unwrap())
        .collect();

    assert_eq!(before, after);
}

#[test]
fn test_rebuild_picks_up_new_entities() {
    let mut kb = trained(&LinkerConfig::default(), drug_entities());
    kb.build_index(&mut NoopReporter).unwrap();

    kb.add_entity(NamedEntity::new("Q1", "Aspirin tablets")).unwrap();
    assert_eq!(kb.state(), KbState::Populated);
    assert_eq!(kb.index().size(), 8);

    kb.build_index(&mut NoopReporter).unwrap();
    assert_eq!(kb.index().size(), 9);
}

#[test]
fn test_shared_alias_ties_follow_insertion_order() {
    let germany = NamedEntity::new("Q64", "Berlin").with_alias("Berlin, Germany");
    let new_hampshire = NamedEntity::new("Q2", "Berlin").with_alias("Berlin, New Hampshire");

    let kb = indexed(vec![germany.clone(), new_hampshire.clone()]);
    let candidates = kb.find_nearest_entities("Berlin", 2).unwrap();
    assert_eq!(ids(&candidates), vec!["Q64", "Q2"]);
    assert_eq!(candidates[0].similarity, candidates[1].similarity);
    assert_eq!(candidates[1].rank, 2);

    let kb = indexed(vec![new_hampshire, germany]);
    let candidates = kb.find_nearest_entities("Berlin", 2).unwrap();
    assert_eq!(ids(&candidates), vec!["Q2", "Q64"]);
}

// ============================================================================
// PERSISTENCE AND COMPOSITE ENCODING
// ============================================================================

#[test]
fn test_saved_encoder_reproduces_results() {
    let config = LinkerConfig::default();
    let inline = indexed(drug_entities());

    let mut encoder = HashingEncoder::new(config.encoder.encoder_config()).unwrap();
    encoder
        .train(
            &inline.alias_corpus(),
            &config.encoder.training_params(),
            &mut NoopReporter,
        )
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encoder.bin");
    encoder.to_model().unwrap().save(&path).unwrap();

    let loaded = EncoderModel::load(&path).unwrap().into_encoder().unwrap();
    let mut kb = KnowledgeBase::with_encoder(
        loaded,
        config.index.clone(),
        config.knowledge_base.clone(),
    )
    .unwrap();
    kb.add_entities(drug_entities()).unwrap();
    kb.build_index(&mut NoopReporter).unwrap();

    for mention in ["Aspirin", "Acetamol", "benzoic"] {
        assert_eq!(
            kb.find_nearest_entities(mention, 3).unwrap(),
            inline.find_nearest_entities(mention, 3).unwrap()
        );
    }
}

#[test]
fn test_aspect_headings() {
    let mut config = LinkerConfig::default();
    config.encoder.preprocessor = PreprocessorKind::Aspect;

    let entities = vec![
        NamedEntity::new("aspirin/dosage", "Aspirin / Dosage"),
        NamedEntity::new("aspirin/history", "Aspirin / History"),
        NamedEntity::new("paracetamol/dosage", "Paracetamol / Dosage"),
    ];
    let mut kb = trained(&config, entities);
    kb.build_index(&mut NoopReporter).unwrap();

    let candidates = kb.find_nearest_entities("aspirin / dosage", 3).unwrap();
    assert_eq!(candidates[0].id(), "aspirin/dosage");
    assert!(candidates[0].similarity > 0.99);
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn top_k_is_bounded(mention in "[a-zA-Z0-9 ]{0,16}", k in 0usize..6) {
        let kb = indexed(drug_entities());
        let candidates = kb.find_nearest_entities(&mention, k).unwrap();
        prop_assert!(candidates.len() <= k);

        let mut seen = std::collections::HashSet::new();
        for candidate in &candidates {
            prop_assert!(seen.insert(candidate.id().to_string()));
            prop_assert!(candidate.similarity > 0.0);
        }
    }

    #[test]
    fn encoding_is_deterministic(mention in "\\PC{0,24}") {
        let kb = indexed(drug_entities());
        let first = kb.encoder().encode(&mention).unwrap();
        let second = kb.encoder().encode(&mention).unwrap();
        prop_assert_eq!(first.len(), 512);
        prop_assert_eq!(first, second);
    }
}
