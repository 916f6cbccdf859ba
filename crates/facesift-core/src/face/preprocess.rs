//! Tensor preparation for the SCRFD detector and the ArcFace encoder.
//!
//! Both models take RGB NCHW float tensors:
//! - SCRFD: letterboxed to a square input, (pixel - 127.5) / 128.0
//! - ArcFace: aligned 112×112 crop, (pixel - 127.5) / 127.5

use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbImage};
use ndarray::Array4;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

const SCRFD_MEAN: f32 = 127.5;
const SCRFD_STD: f32 = 128.0;

const ARCFACE_MEAN: f32 = 127.5;
// Symmetric normalization, unlike SCRFD.
const ARCFACE_STD: f32 = 127.5;

/// Scale and padding applied when letterboxing, used to map detections back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Letterbox {
    /// Map a point from letterboxed input space to source-image space.
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Fit an image inside a `size × size` square, preserving aspect ratio, centred,
/// with the padding normalizing to 0.0.
pub(crate) fn letterbox(image: &DynamicImage, size: u32) -> (Array4<f32>, Letterbox) {
    let (width, height) = image.dimensions();
    let scale = (size as f32 / width as f32).min(size as f32 / height as f32);

    let new_w = ((width as f32 * scale).round() as u32).clamp(1, size);
    let new_h = ((height as f32 * scale).round() as u32).clamp(1, size);
    let pad_x = (size - new_w) / 2;
    let pad_y = (size - new_h) / 2;

    let resized = image
        .resize_exact(new_w, new_h, FilterType::Triangle)
        .to_rgb8();

    let side = size as usize;
    let mut tensor = Array4::<f32>::zeros((1, CHANNELS, side, side));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let ty = (y + pad_y) as usize;
        let tx = (x + pad_x) as usize;
        for (c, &val) in pixel.0.iter().enumerate() {
            tensor[[0, c, ty, tx]] = (val as f32 - SCRFD_MEAN) / SCRFD_STD;
        }
    }

    (
        tensor,
        Letterbox {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
        },
    )
}

/// Convert an aligned face crop into the ArcFace input tensor.
pub(crate) fn arcface_tensor(face: &RgbImage) -> Array4<f32> {
    let (width, height) = face.dimensions();
    let mut tensor = Array4::<f32>::zeros((1, CHANNELS, height as usize, width as usize));
    for (x, y, pixel) in face.enumerate_pixels() {
        for (c, &val) in pixel.0.iter().enumerate() {
            tensor[[0, c, y as usize, x as usize]] = (val as f32 - ARCFACE_MEAN) / ARCFACE_STD;
        }
    }
    tensor
}

/// Flatten a tensor into the `(shape, data)` pair ONNX Runtime accepts.
pub(crate) fn to_ort_input(tensor: &Array4<f32>) -> (Vec<i64>, Vec<f32>) {
    let shape = tensor.shape().iter().map(|&d| d as i64).collect();
    let data = tensor.iter().copied().collect();
    (shape, data)
}
