//! Similarity metrics
//!
//! An index uses exactly one metric for its whole lifetime, so similarity
//! thresholds downstream stay meaningful.

use serde::{Deserialize, Serialize};

/// Similarity metric, fixed per index instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Cosine similarity in [-1, 1]; 1.0 means identical direction
    #[default]
    Cosine,
    /// `1 / (1 + euclidean distance)`, in (0, 1]; for magnitude-sensitive vectors
    InverseEuclidean,
}

impl Metric {
    /// Similarity of a query against a stored vector.
    ///
    /// Norms are passed in so they can be computed once per vector.
    pub fn similarity(self, query: &[f32], query_norm: f32, stored: &[f32], stored_norm: f32) -> f32 {
        match self {
            Metric::Cosine => {
                if query_norm == 0.0 || stored_norm == 0.0 {
                    0.0
                } else {
                    // Rounding can push identical directions just past 1.0
                    (dot(query, stored) / (query_norm * stored_norm)).clamp(-1.0, 1.0)
                }
            }
            Metric::InverseEuclidean => 1.0 / (1.0 + euclidean_distance(query, stored)),
        }
    }

    /// Whether a query vector can be ranked at all under this metric.
    ///
    /// A zero vector has no direction, so cosine ranking is undefined.
    pub fn accepts_query(self, query_norm: f32) -> bool {
        match self {
            Metric::Cosine => query_norm > 0.0,
            Metric::InverseEuclidean => true,
        }
    }
}

/// Dot product of two equal-length vectors
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// L2 norm of a vector
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Cosine similarity; 0.0 when either vector is zero
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    Metric::Cosine.similarity(a, l2_norm(a), b, l2_norm(b))
}
