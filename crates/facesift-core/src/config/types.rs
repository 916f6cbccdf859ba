//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lower bound of the nominal tolerance range offered by the interactive prompt.
pub const MIN_TOLERANCE: f32 = 0.4;

/// Upper bound of the nominal tolerance range offered by the interactive prompt.
pub const MAX_TOLERANCE: f32 = 1.0;

/// Default face-distance tolerance.
pub const DEFAULT_TOLERANCE: f32 = 0.6;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.facesift/models"),
        }
    }
}

/// Distance function used to compare two face embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// 1 - cosine similarity, in [0, 2]
    #[default]
    Cosine,
    /// Euclidean (L2) distance between the vectors
    Euclidean,
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceMetric::Cosine => write!(f, "cosine"),
            DistanceMetric::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// Match decision settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Maximum embedding distance accepted as a match. Lower is stricter.
    pub tolerance: f32,

    /// Distance function applied between embeddings
    pub metric: DistanceMetric,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            metric: DistanceMetric::Cosine,
        }
    }
}

/// Album scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Admissible file extensions (case-insensitive, leading dot optional)
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// The extensions admitted when none are configured.
pub fn default_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "bmp", "gif"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

/// SCRFD face detector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Model filename inside the model directory
    pub model: String,

    /// Square input size the image is letterboxed to
    pub input_size: u32,

    /// Minimum detector score for a face to be kept
    pub confidence_threshold: f32,

    /// IoU above which overlapping detections are suppressed
    pub nms_threshold: f32,

    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,

    /// Optional BLAKE3 pin checked after download
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            model: "scrfd_500m_bnkps.onnx".to_string(),
            input_size: 640,
            confidence_threshold: 0.5,
            nms_threshold: 0.4,
            intra_threads: 2,
            checksum: None,
        }
    }
}

/// ArcFace recognizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Model filename inside the model directory
    pub model: String,

    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,

    /// Optional BLAKE3 pin checked after download
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            model: "w600k_r50.onnx".to_string(),
            intra_threads: 2,
            checksum: None,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
