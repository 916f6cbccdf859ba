//! The comparison basis: one embedding per usable reference image.

use std::path::{Path, PathBuf};

use super::decode::ImageDecoder;
use crate::error::{PipelineError, PipelineResult};
use crate::face::FaceModel;
use crate::types::FaceEmbedding;

#[derive(Debug, Clone)]
pub struct ReferenceFace {
    /// Image the embedding was taken from
    pub source: PathBuf,
    pub embedding: FaceEmbedding,
}

/// Built once per run, never mutated afterwards. Never empty.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    faces: Vec<ReferenceFace>,
    requested: usize,
}

impl ReferenceSet {
    /// Embed the most confident face of each reference image.
    ///
    /// Images that fail to load or contain no face are reported and skipped.
    /// Fails with [`PipelineError::NoUsableReference`] when nothing survives.
    pub fn build<M: FaceModel + ?Sized>(
        paths: &[PathBuf],
        model: &mut M,
        decoder: &ImageDecoder,
    ) -> PipelineResult<Self> {
        let mut faces = Vec::with_capacity(paths.len());

        for path in paths {
            match reference_embedding(path, model, decoder) {
                Ok(Some(embedding)) => {
                    tracing::debug!(path = %path.display(), "Loaded reference face");
                    faces.push(ReferenceFace {
                        source: path.clone(),
                        embedding,
                    });
                }
                Ok(None) => {
                    tracing::warn!(path = %path.display(), "No face found in reference image, skipping");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot use reference image, skipping");
                }
            }
        }

        Self::from_faces(faces, paths.len())
    }

    /// Wrap already-computed reference faces.
    pub fn from_faces(faces: Vec<ReferenceFace>, requested: usize) -> PipelineResult<Self> {
        if faces.is_empty() {
            return Err(PipelineError::NoUsableReference { requested });
        }
        Ok(Self { faces, requested })
    }

    pub fn embeddings(&self) -> impl Iterator<Item = &FaceEmbedding> {
        self.faces.iter().map(|f| &f.embedding)
    }

    /// Number of usable references.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Number of reference images supplied, usable or not.
    pub fn requested(&self) -> usize {
        self.requested
    }
}

fn reference_embedding<M: FaceModel + ?Sized>(
    path: &Path,
    model: &mut M,
    decoder: &ImageDecoder,
) -> PipelineResult<Option<FaceEmbedding>> {
    let image = decoder.decode(path)?;

    let regions = model
        .detect(&image)
        .map_err(|source| PipelineError::Detection {
            path: path.to_path_buf(),
            source,
        })?;
    let Some(first) = regions.first() else {
        return Ok(None);
    };

    let embeddings = model
        .embed(&image, std::slice::from_ref(first))
        .map_err(|source| PipelineError::Embedding {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(embeddings.into_iter().next())
}
