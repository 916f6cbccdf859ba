//! Face detection and embedding.
//!
//! The pipeline only talks to [`FaceModel`]; [`OnnxFaceModel`] is the
//! production implementation pairing an SCRFD detector with an ArcFace
//! encoder. Tests substitute their own implementation.

mod align;
pub mod detector;
pub mod encoder;
mod preprocess;

pub use detector::ScrfdDetector;
pub use encoder::ArcFaceEncoder;

use image::DynamicImage;

use crate::config::Config;
use crate::error::FaceModelError;
use crate::types::{FaceEmbedding, FaceRegion};

/// Detects faces in a decoded image and embeds each detected region.
///
/// Embeddings from one model are only comparable with embeddings from the
/// same model.
pub trait FaceModel {
    /// Locate faces. An empty result means no face was found.
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<FaceRegion>, FaceModelError>;

    /// One embedding per region, in the same order.
    fn embed(
        &mut self,
        image: &DynamicImage,
        regions: &[FaceRegion],
    ) -> Result<Vec<FaceEmbedding>, FaceModelError>;
}

impl<M: FaceModel + ?Sized> FaceModel for Box<M> {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<FaceRegion>, FaceModelError> {
        (**self).detect(image)
    }

    fn embed(
        &mut self,
        image: &DynamicImage,
        regions: &[FaceRegion],
    ) -> Result<Vec<FaceEmbedding>, FaceModelError> {
        (**self).embed(image, regions)
    }
}

/// SCRFD + ArcFace on ONNX Runtime.
pub struct OnnxFaceModel {
    detector: ScrfdDetector,
    encoder: ArcFaceEncoder,
}

impl OnnxFaceModel {
    /// Load both models from the configured model directory.
    pub fn load(config: &Config) -> Result<Self, FaceModelError> {
        let detector = ScrfdDetector::load(&config.detector_path(), &config.detection)?;
        let encoder = ArcFaceEncoder::load(&config.recognizer_path(), &config.recognition)?;
        tracing::info!(
            model_dir = %config.model_dir().display(),
            "Face models loaded"
        );
        Ok(Self { detector, encoder })
    }

    /// Whether both model files are present.
    pub fn models_exist(config: &Config) -> bool {
        config.detector_path().exists() && config.recognizer_path().exists()
    }
}

impl FaceModel for OnnxFaceModel {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<FaceRegion>, FaceModelError> {
        self.detector.detect(image)
    }

    fn embed(
        &mut self,
        image: &DynamicImage,
        regions: &[FaceRegion],
    ) -> Result<Vec<FaceEmbedding>, FaceModelError> {
        if regions.is_empty() {
            return Ok(Vec::new());
        }
        let rgb = image.to_rgb8();
        regions
            .iter()
            .map(|region| self.encoder.encode(&rgb, region))
            .collect()
    }
}
