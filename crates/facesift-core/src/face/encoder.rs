//! ArcFace face encoder: aligned 112×112 crop in, L2-normalized embedding out.

use std::path::Path;

use image::RgbImage;
use ort::session::Session;
use ort::value::Value;

use super::align::{align_face, crop_face};
use super::preprocess::{arcface_tensor, to_ort_input};
use crate::config::RecognitionConfig;
use crate::error::FaceModelError;
use crate::math::l2_normalize_in_place;
use crate::types::{FaceEmbedding, FaceRegion};

pub struct ArcFaceEncoder {
    session: Session,
    input_name: String,
}

impl ArcFaceEncoder {
    pub fn load(model_path: &Path, config: &RecognitionConfig) -> Result<Self, FaceModelError> {
        if !model_path.exists() {
            return Err(FaceModelError::ModelNotFound(model_path.to_path_buf()));
        }

        let invalid = |message: String| FaceModelError::InvalidModel {
            path: model_path.to_path_buf(),
            message,
        };

        let session = Session::builder()
            .map_err(|e| invalid(format!("failed to create session builder: {e}")))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| invalid(format!("failed to set intra threads: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| invalid(format!("failed to load ONNX model: {e}")))?;

        if session.outputs().is_empty() {
            return Err(invalid("model has no outputs".to_string()));
        }

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input.1".to_string());

        tracing::debug!(
            path = %model_path.display(),
            input = %input_name,
            "Loaded ArcFace encoder"
        );

        Ok(Self {
            session,
            input_name,
        })
    }

    /// Embed one detected face.
    ///
    /// Uses landmark alignment when available, otherwise a bounding-box crop.
    pub fn encode(
        &mut self,
        image: &RgbImage,
        region: &FaceRegion,
    ) -> Result<FaceEmbedding, FaceModelError> {
        let face = region
            .landmarks
            .as_ref()
            .and_then(|lms| align_face(image, lms))
            .unwrap_or_else(|| crop_face(image, region));

        let tensor = arcface_tensor(&face);
        let input_value = Value::from_array(to_ort_input(&tensor))?;
        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| FaceModelError::Inference(format!("ArcFace run failed: {e}")))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| FaceModelError::Inference(format!("embedding tensor: {e}")))?;

        // [1, D] or [D]
        let dim = shape.last().copied().unwrap_or(0) as usize;
        if dim == 0 || data.len() < dim {
            return Err(FaceModelError::Inference(format!(
                "unexpected embedding shape {shape:?}"
            )));
        }

        let mut values = data[..dim].to_vec();
        l2_normalize_in_place(&mut values);
        Ok(FaceEmbedding::new(values))
    }
}
