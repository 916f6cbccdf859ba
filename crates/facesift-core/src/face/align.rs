//! Face alignment to the canonical 112×112 ArcFace template.
//!
//! A 4-DOF similarity (scale, rotation, translation) is fitted from the five
//! detected landmarks to the template by least squares, then the source image
//! is sampled through its inverse.

use image::{imageops, imageops::FilterType, Rgb, RgbImage};

use crate::types::FaceRegion;

/// Side length of the aligned crop.
pub(crate) const ALIGNED_SIZE: u32 = 112;

/// InsightFace template landmarks for a 112×112 crop.
const TEMPLATE_LANDMARKS: [(f32, f32); 5] = [
    (38.2946, 51.6963), // left eye
    (73.5318, 51.5014), // right eye
    (56.0252, 71.7366), // nose
    (41.5493, 92.3655), // left mouth
    (70.7299, 92.2041), // right mouth
];

/// `x' = a·x − b·y + tx`, `y' = b·x + a·y + ty`
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Similarity {
    pub a: f32,
    pub b: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Similarity {
    /// Closed-form least-squares fit mapping `src` onto `dst`.
    ///
    /// Returns `None` when the source points are degenerate (all coincident).
    pub fn estimate(src: &[(f32, f32); 5], dst: &[(f32, f32); 5]) -> Option<Self> {
        let n = src.len() as f32;
        let (msx, msy) = mean(src);
        let (mdx, mdy) = mean(dst);

        let mut denom = 0.0f32;
        let mut num_a = 0.0f32;
        let mut num_b = 0.0f32;
        for (&(sx, sy), &(dx, dy)) in src.iter().zip(dst.iter()) {
            let (sx, sy) = (sx - msx, sy - msy);
            let (dx, dy) = (dx - mdx, dy - mdy);
            denom += sx * sx + sy * sy;
            num_a += sx * dx + sy * dy;
            num_b += sx * dy - sy * dx;
        }

        if denom / n < 1e-6 {
            return None;
        }

        let a = num_a / denom;
        let b = num_b / denom;
        Some(Self {
            a,
            b,
            tx: mdx - (a * msx - b * msy),
            ty: mdy - (b * msx + a * msy),
        })
    }

    pub fn apply(&self, (x, y): (f32, f32)) -> (f32, f32) {
        (
            self.a * x - self.b * y + self.tx,
            self.b * x + self.a * y + self.ty,
        )
    }

    pub fn inverse(&self) -> Option<Self> {
        let det = self.a * self.a + self.b * self.b;
        if det < f32::EPSILON {
            return None;
        }
        let a = self.a / det;
        let b = -self.b / det;
        Some(Self {
            a,
            b,
            tx: -(a * self.tx - b * self.ty),
            ty: -(b * self.tx + a * self.ty),
        })
    }
}

fn mean(points: &[(f32, f32); 5]) -> (f32, f32) {
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x, ay + y));
    (sx / points.len() as f32, sy / points.len() as f32)
}

/// Warp the face described by `landmarks` onto the canonical template.
///
/// Returns `None` when the landmarks are degenerate.
pub(crate) fn align_face(image: &RgbImage, landmarks: &[(f32, f32); 5]) -> Option<RgbImage> {
    let forward = Similarity::estimate(landmarks, &TEMPLATE_LANDMARKS)?;
    let inverse = forward.inverse()?;

    let mut out = RgbImage::new(ALIGNED_SIZE, ALIGNED_SIZE);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let (sx, sy) = inverse.apply((x as f32, y as f32));
        *pixel = sample_bilinear(image, sx, sy);
    }
    Some(out)
}

/// Crop the bounding box and resize it to the template size.
///
/// Used when the detector did not return landmarks or they were degenerate.
pub(crate) fn crop_face(image: &RgbImage, region: &FaceRegion) -> RgbImage {
    let (width, height) = image.dimensions();
    let x0 = region.x.max(0.0).min(width as f32) as u32;
    let y0 = region.y.max(0.0).min(height as f32) as u32;
    let x1 = (region.x + region.width).max(0.0).min(width as f32) as u32;
    let y1 = (region.y + region.height).max(0.0).min(height as f32) as u32;

    let crop = if x1 > x0 && y1 > y0 {
        imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image()
    } else {
        image.clone()
    };

    imageops::resize(&crop, ALIGNED_SIZE, ALIGNED_SIZE, FilterType::Triangle)
}

/// Bilinear sample; points outside the image read as black.
fn sample_bilinear(image: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let (width, height) = image.dimensions();
    if x < 0.0 || y < 0.0 || x > (width - 1) as f32 || y > (height - 1) as f32 {
        return Rgb([0, 0, 0]);
    }

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let tl = image.get_pixel(x0, y0).0;
    let tr = image.get_pixel(x1, y0).0;
    let bl = image.get_pixel(x0, y1).0;
    let br = image.get_pixel(x1, y1).0;

    let mut out = [0u8; 3];
    for c in 0..3 {
        let val = tl[c] as f32 * (1.0 - fx) * (1.0 - fy)
            + tr[c] as f32 * fx * (1.0 - fy)
            + bl[c] as f32 * (1.0 - fx) * fy
            + br[c] as f32 * fx * fy;
        out[c] = val.round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}
