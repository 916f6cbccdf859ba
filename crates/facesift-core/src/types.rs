//! Core data types for the Facesift matching pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A detected face: bounding box in source-image pixels plus optional landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Detector score in [0, 1]
    pub confidence: f32,
    /// Five-point landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

impl FaceRegion {
    /// Region without landmarks.
    pub fn new(x: f32, y: f32, width: f32, height: f32, confidence: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
            landmarks: None,
        }
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Intersection-over-union with another region.
    pub fn iou(&self, other: &FaceRegion) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - inter;

        if union > 0.0 {
            inter / union
        } else {
            0.0
        }
    }
}

/// Fixed-length embedding produced by the face model for one detected region.
///
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceEmbedding {
    values: Vec<f32>,
}

impl FaceEmbedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Embedding dimension.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<f32>> for FaceEmbedding {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

/// An album file admitted for processing based on its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Full path to the file
    pub path: PathBuf,
    /// Lowercased extension without the leading dot
    pub extension: String,
}

impl Candidate {
    pub fn new(path: PathBuf, extension: impl Into<String>) -> Self {
        Self {
            path,
            extension: extension.into(),
        }
    }

    /// File name as it will appear in the output directory.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Per-candidate outcome of the match engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchDecision {
    /// At least one face is within tolerance of at least one reference
    Matched,
    /// Faces were found but none is within tolerance of any reference
    NoMatch,
    /// The detector found no face
    NoFaceDetected,
    /// Loading, detection or encoding failed for this image
    ProcessingError { message: String },
}

impl MatchDecision {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchDecision::Matched)
    }

    /// True for the two outcomes counted as "skipped".
    pub fn is_skip(&self) -> bool {
        matches!(self, MatchDecision::NoMatch | MatchDecision::NoFaceDetected)
    }
}

impl std::fmt::Display for MatchDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchDecision::Matched => write!(f, "matched"),
            MatchDecision::NoMatch => write!(f, "no match"),
            MatchDecision::NoFaceDetected => write!(f, "no face detected"),
            MatchDecision::ProcessingError { message } => write!(f, "error: {message}"),
        }
    }
}

/// Final counters of a run. Read-only once returned by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Images copied to the output directory
    pub matched: u64,
    /// Images with no face or no matching face
    pub skipped: u64,
    /// Images that failed to load, decode, detect, encode or copy
    pub errored: u64,
    /// Absolute output directory
    pub output_dir: PathBuf,
}

impl RunSummary {
    /// Summary of a run that processed nothing.
    pub fn empty(output_dir: PathBuf) -> Self {
        Self {
            matched: 0,
            skipped: 0,
            errored: 0,
            output_dir,
        }
    }

    /// Number of candidates accounted for.
    pub fn total(&self) -> u64 {
        self.matched + self.skipped + self.errored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou_identical() {
        let a = FaceRegion::new(0.0, 0.0, 100.0, 100.0, 1.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_partial() {
        let a = FaceRegion::new(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = FaceRegion::new(5.0, 0.0, 10.0, 10.0, 1.0);
        // Overlap 50, union 150
        assert!((a.iou(&b) - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_disjoint_and_degenerate() {
        let a = FaceRegion::new(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = FaceRegion::new(20.0, 20.0, 10.0, 10.0, 1.0);
        assert_eq!(a.iou(&b), 0.0);

        let empty = FaceRegion::new(0.0, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(empty.iou(&empty), 0.0);
    }

    #[test]
    fn test_candidate_file_name() {
        let c = Candidate::new(PathBuf::from("/album/PHOTO.JPG"), "jpg");
        assert_eq!(c.file_name(), "PHOTO.JPG");
    }

    #[test]
    fn test_decision_classification() {
        assert!(MatchDecision::Matched.is_match());
        assert!(MatchDecision::NoMatch.is_skip());
        assert!(MatchDecision::NoFaceDetected.is_skip());
        let err = MatchDecision::ProcessingError {
            message: "boom".into(),
        };
        assert!(!err.is_match());
        assert!(!err.is_skip());
        assert_eq!(err.to_string(), "error: boom");
    }

    #[test]
    fn test_summary_total() {
        let summary = RunSummary {
            matched: 1,
            skipped: 2,
            errored: 3,
            output_dir: PathBuf::from("/out"),
        };
        assert_eq!(summary.total(), 6);
        assert_eq!(RunSummary::empty(PathBuf::from("/out")).total(), 0);
    }
}
