//! Candidate ranking: alias-level hits → entity-level candidates

use std::collections::HashSet;

/// An entity's best alias hit after collapsing
#[derive(Debug, Clone, PartialEq)]
pub struct RankedHit {
    pub entity_id: String,
    pub similarity: f32,
    /// 1-based position in the raw alias stream where the entity first appeared
    pub rank: usize,
}

/// Stable sort by descending similarity; equal scores keep their order
pub fn sort_by_similarity<T>(items: &mut [T], similarity: impl Fn(&T) -> f32) {
    items.sort_by(|a, b| similarity(b).total_cmp(&similarity(a)));
}

/// Collapse `(entity id, similarity)` alias hits into at most `k` entities.
///
/// `hits` must already be in descending similarity order. The first hit of
/// each entity wins. Hits at or below `min_similarity` end the stream.
/// `rank` counts every raw hit, including the ones collapsed away.
pub fn collapse_by_entity<I, S>(hits: I, k: usize, min_similarity: f32) -> Vec<RankedHit>
where
    I: IntoIterator<Item = (S, f32)>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut ranked = Vec::new();
    if k == 0 {
        return ranked;
    }

    for (position, (entity_id, similarity)) in hits.into_iter().enumerate() {
        if similarity <= min_similarity {
            break;
        }
        let entity_id = entity_id.as_ref();
        if !seen.insert(entity_id.to_string()) {
            continue;
        }

        ranked.push(RankedHit {
            entity_id: entity_id.to_string(),
            similarity,
            rank: position + 1,
        });
        if ranked.len() == k {
            break;
        }
    }
    ranked
}
