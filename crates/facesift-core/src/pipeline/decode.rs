//! Image loading: validation, content-sniffed decode, dimension limits.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageFormat};

use super::validate::Validator;
use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Loads one image fully into memory, releasing the file before returning.
pub struct ImageDecoder {
    validator: Validator,
    limits: LimitsConfig,
}

impl ImageDecoder {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            validator: Validator::new(limits.clone()),
            limits,
        }
    }

    pub fn decode(&self, path: &Path) -> Result<DynamicImage, PipelineError> {
        self.validator.validate(path)?;

        let bytes = std::fs::read(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read file: {e}"),
        })?;

        let image = decode_bytes(bytes, path)?;

        let (width, height) = image.dimensions();
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim,
            });
        }

        tracing::trace!(path = %path.display(), width, height, "Decoded image");
        Ok(image)
    }
}

/// Decode by content, falling back to the extension when sniffing fails.
fn decode_bytes(bytes: Vec<u8>, path: &Path) -> Result<DynamicImage, PipelineError> {
    let mut reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot detect image format: {e}"),
        })?;

    if reader.format().is_none() {
        let format = ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        })?;
        reader.set_format(format);
    }

    reader.decode().map_err(|e| PipelineError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
