//! Embedding distance and the tolerance threshold.
//!
//! Lower distance means more similar. A probe matches a reference when
//! `distance <= tolerance`.

use crate::config::DistanceMetric;
use crate::math::{cosine_similarity, euclidean_distance};
use crate::types::FaceEmbedding;

pub trait Comparator: Send + Sync {
    /// Distance between two embeddings. Embeddings of different dimension
    /// are infinitely far apart.
    fn distance(&self, a: &FaceEmbedding, b: &FaceEmbedding) -> f32;

    /// Per-reference match flags for one probe, in reference order.
    fn compare(
        &self,
        references: &[FaceEmbedding],
        probe: &FaceEmbedding,
        tolerance: f32,
    ) -> Vec<bool> {
        references
            .iter()
            .map(|r| self.distance(r, probe) <= tolerance)
            .collect()
    }
}

/// `1 - cosine similarity`, in [0, 2].
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineDistance;

impl Comparator for CosineDistance {
    fn distance(&self, a: &FaceEmbedding, b: &FaceEmbedding) -> f32 {
        if a.len() != b.len() {
            return f32::INFINITY;
        }
        1.0 - cosine_similarity(a.values(), b.values())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl Comparator for EuclideanDistance {
    fn distance(&self, a: &FaceEmbedding, b: &FaceEmbedding) -> f32 {
        if a.len() != b.len() {
            return f32::INFINITY;
        }
        euclidean_distance(a.values(), b.values())
    }
}

pub fn comparator_for(metric: DistanceMetric) -> Box<dyn Comparator> {
    match metric {
        DistanceMetric::Cosine => Box::new(CosineDistance),
        DistanceMetric::Euclidean => Box::new(EuclideanDistance),
    }
}
