//! Run orchestration: references, scan, decide, copy.

use std::path::PathBuf;

use super::compare::comparator_for;
use super::decode::ImageDecoder;
use super::discovery::ImageScanner;
use super::matcher::MatchEngine;
use super::reference::ReferenceSet;
use super::sink::ResultSink;
use crate::config::{Config, DistanceMetric, LimitsConfig};
use crate::error::PipelineResult;
use crate::face::FaceModel;
use crate::types::{Candidate, MatchDecision, RunSummary};

/// Inputs for one run. Paths are expected to be already normalized.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub album_dir: PathBuf,
    pub output_dir: PathBuf,
    pub references: Vec<PathBuf>,
    pub tolerance: f32,
    pub metric: DistanceMetric,
    pub extensions: Vec<String>,
}

impl SearchRequest {
    /// Request using the matching and scan settings from `config`.
    pub fn new(
        album_dir: PathBuf,
        output_dir: PathBuf,
        references: Vec<PathBuf>,
        config: &Config,
    ) -> Self {
        Self {
            album_dir,
            output_dir,
            references,
            tolerance: config.matching.tolerance,
            metric: config.matching.metric,
            extensions: config.scan.extensions.clone(),
        }
    }
}

/// Progress notifications emitted during a run.
#[derive(Debug)]
pub enum SearchEvent<'a> {
    ReferencesLoaded { usable: usize, requested: usize },
    CandidatesFound { total: usize },
    /// Emitted after the decision has been acted on.
    Decided {
        candidate: &'a Candidate,
        decision: &'a MatchDecision,
    },
}

/// Owns the face model for the duration of one or more runs.
pub struct FaceSearch<M: FaceModel> {
    model: M,
    decoder: ImageDecoder,
}

impl<M: FaceModel> FaceSearch<M> {
    pub fn new(model: M, limits: LimitsConfig) -> Self {
        Self {
            model,
            decoder: ImageDecoder::new(limits),
        }
    }

    pub fn run(&mut self, request: &SearchRequest) -> PipelineResult<RunSummary> {
        self.run_with_progress(request, |_| {})
    }

    /// Fails only when the output directory cannot be created or no reference
    /// image yields a face; in the latter case the album is never scanned.
    pub fn run_with_progress<F>(
        &mut self,
        request: &SearchRequest,
        mut on_event: F,
    ) -> PipelineResult<RunSummary>
    where
        F: FnMut(SearchEvent<'_>),
    {
        let mut sink = ResultSink::new(&request.output_dir)?;

        let references = ReferenceSet::build(&request.references, &mut self.model, &self.decoder)?;
        tracing::info!(
            usable = references.len(),
            requested = references.requested(),
            "Reference faces loaded"
        );
        on_event(SearchEvent::ReferencesLoaded {
            usable: references.len(),
            requested: references.requested(),
        });

        let engine = MatchEngine::new(references, comparator_for(request.metric), request.tolerance);

        let candidates = ImageScanner::new(&request.extensions).scan(&request.album_dir);
        on_event(SearchEvent::CandidatesFound {
            total: candidates.len(),
        });

        for candidate in &candidates {
            let decision = engine.decide(&mut self.model, &self.decoder, candidate);
            tracing::debug!(file = %candidate.file_name(), %decision, "Decided");
            let decision = sink.record(candidate, decision);
            on_event(SearchEvent::Decided {
                candidate,
                decision: &decision,
            });
        }

        let summary = sink.finish();
        tracing::info!(
            matched = summary.matched,
            skipped = summary.skipped,
            errored = summary.errored,
            output = %summary.output_dir.display(),
            "Search complete"
        );
        Ok(summary)
    }
}

impl FaceSearch<crate::face::OnnxFaceModel> {
    /// Load the ONNX face models named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, crate::error::FaceModelError> {
        let model = crate::face::OnnxFaceModel::load(config)?;
        Ok(Self::new(model, config.limits.clone()))
    }
}
