//! Error types for the Facesift matching pipeline.
//!
//! Errors are organized by stage. Everything that can be pinned to a single
//! image carries its path, so the per-image boundary can report it and move on.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised by the face detection / embedding collaborator.
#[derive(Error, Debug)]
pub enum FaceModelError {
    /// The ONNX file is missing from the model directory
    #[error("model file not found: {0} (run `facesift models download`)")]
    ModelNotFound(PathBuf),

    /// The ONNX file loaded but does not have the expected shape
    #[error("unsupported model {path}: {message}")]
    InvalidModel { path: PathBuf, message: String },

    /// Inference produced unusable output
    #[error("inference failed: {0}")]
    Inference(String),

    /// ONNX Runtime error
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Face detection failed
    #[error("Face detection failed for {path}: {source}")]
    Detection {
        path: PathBuf,
        #[source]
        source: FaceModelError,
    },

    /// Face embedding failed
    #[error("Face embedding failed for {path}: {source}")]
    Embedding {
        path: PathBuf,
        #[source]
        source: FaceModelError,
    },

    /// Copying a matched image into the output directory failed
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created
    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No reference image yielded a face embedding
    #[error("No valid reference faces found ({requested} reference image(s) checked)")]
    NoUsableReference { requested: usize },
}

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
