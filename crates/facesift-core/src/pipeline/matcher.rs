//! Per-candidate match decision.

use std::path::Path;

use image::DynamicImage;

use super::compare::Comparator;
use super::decode::ImageDecoder;
use super::reference::ReferenceSet;
use crate::error::{PipelineError, PipelineResult};
use crate::face::FaceModel;
use crate::types::{Candidate, FaceEmbedding, MatchDecision};

/// Decides whether a candidate shows any of the reference faces.
///
/// A face matches when it is within tolerance of *any* reference; an image
/// matches as soon as one of its faces does.
pub struct MatchEngine {
    references: ReferenceSet,
    comparator: Box<dyn Comparator>,
    tolerance: f32,
}

impl MatchEngine {
    pub fn new(references: ReferenceSet, comparator: Box<dyn Comparator>, tolerance: f32) -> Self {
        Self {
            references,
            comparator,
            tolerance,
        }
    }

    /// Load, detect, embed and compare one candidate.
    ///
    /// Never fails: any error for this candidate becomes
    /// [`MatchDecision::ProcessingError`].
    pub fn decide<M: FaceModel + ?Sized>(
        &self,
        model: &mut M,
        decoder: &ImageDecoder,
        candidate: &Candidate,
    ) -> MatchDecision {
        let result = decoder
            .decode(candidate.path())
            .and_then(|image| self.evaluate(model, &image, candidate.path()));

        match result {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(file = %candidate.file_name(), error = %e, "Error processing image");
                MatchDecision::ProcessingError {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Decision for an already decoded image.
    pub fn evaluate<M: FaceModel + ?Sized>(
        &self,
        model: &mut M,
        image: &DynamicImage,
        path: &Path,
    ) -> PipelineResult<MatchDecision> {
        let regions = model
            .detect(image)
            .map_err(|source| PipelineError::Detection {
                path: path.to_path_buf(),
                source,
            })?;
        if regions.is_empty() {
            return Ok(MatchDecision::NoFaceDetected);
        }

        let embeddings = model
            .embed(image, &regions)
            .map_err(|source| PipelineError::Embedding {
                path: path.to_path_buf(),
                source,
            })?;

        if embeddings.iter().any(|e| self.matches(e)) {
            Ok(MatchDecision::Matched)
        } else {
            Ok(MatchDecision::NoMatch)
        }
    }

    /// Whether `embedding` is within tolerance of any reference.
    pub fn matches(&self, embedding: &FaceEmbedding) -> bool {
        self.references
            .embeddings()
            .any(|r| self.comparator.distance(r, embedding) <= self.tolerance)
    }
}
