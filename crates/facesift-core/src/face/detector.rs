//! SCRFD face detector running on ONNX Runtime.
//!
//! SCRFD emits, per feature stride (8, 16, 32), a score map, distance-encoded
//! bounding boxes and optionally five keypoints, for two anchors per grid cell.
//! The `*_kps` variants have 9 outputs; the bbox-only variants have 6.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ort::session::Session;
use ort::value::Value;

use super::preprocess::{letterbox, to_ort_input, Letterbox};
use crate::config::DetectionConfig;
use crate::error::FaceModelError;
use crate::types::FaceRegion;

const SCRFD_STRIDES: [usize; 3] = [8, 16, 32];
const ANCHORS_PER_CELL: usize = 2;

/// Output tensor indices for one stride: (score, bbox, kps).
type StrideOutputIndices = (usize, usize, Option<usize>);

pub struct ScrfdDetector {
    session: Session,
    input_name: String,
    input_size: usize,
    confidence_threshold: f32,
    nms_threshold: f32,
    /// Per-stride output indices for strides [8, 16, 32].
    stride_indices: [StrideOutputIndices; 3],
}

impl ScrfdDetector {
    /// Load the SCRFD model and resolve its output layout.
    pub fn load(model_path: &Path, config: &DetectionConfig) -> Result<Self, FaceModelError> {
        if !model_path.exists() {
            return Err(FaceModelError::ModelNotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| invalid(model_path, format!("failed to create session builder: {e}")))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| invalid(model_path, format!("failed to set intra threads: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| invalid(model_path, format!("failed to load ONNX model: {e}")))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input.1".to_string());
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .collect();

        let stride_indices = discover_output_indices(&output_names).ok_or_else(|| {
            invalid(
                model_path,
                format!(
                    "expected 6 or 9 outputs (score/bbox[/kps] per stride), got {}",
                    output_names.len()
                ),
            )
        })?;

        tracing::debug!(
            path = %model_path.display(),
            input = %input_name,
            outputs = ?output_names,
            ?stride_indices,
            "Loaded SCRFD detector"
        );

        Ok(Self {
            session,
            input_name,
            input_size: config.input_size as usize,
            confidence_threshold: config.confidence_threshold,
            nms_threshold: config.nms_threshold,
            stride_indices,
        })
    }

    /// Detect faces, returning regions in source-image pixels sorted by confidence.
    pub fn detect(&mut self, image: &DynamicImage) -> Result<Vec<FaceRegion>, FaceModelError> {
        let (tensor, lb) = letterbox(image, self.input_size as u32);
        let input_value = Value::from_array(to_ort_input(&tensor))?;
        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| FaceModelError::Inference(format!("SCRFD run failed: {e}")))?;

        let mut detections = Vec::new();
        for (pos, &stride) in SCRFD_STRIDES.iter().enumerate() {
            let (score_idx, bbox_idx, kps_idx) = self.stride_indices[pos];

            let (_, scores) = outputs[score_idx].try_extract_tensor::<f32>().map_err(|e| {
                FaceModelError::Inference(format!("scores for stride {stride}: {e}"))
            })?;
            let (_, bboxes) = outputs[bbox_idx].try_extract_tensor::<f32>().map_err(|e| {
                FaceModelError::Inference(format!("bboxes for stride {stride}: {e}"))
            })?;
            let kps = match kps_idx {
                Some(idx) => Some(
                    outputs[idx]
                        .try_extract_tensor::<f32>()
                        .map_err(|e| {
                            FaceModelError::Inference(format!("keypoints for stride {stride}: {e}"))
                        })?
                        .1,
                ),
                None => None,
            };

            detections.extend(decode_stride(
                scores,
                bboxes,
                kps,
                stride,
                self.input_size,
                &lb,
                self.confidence_threshold,
            ));
        }

        Ok(nms(detections, self.nms_threshold))
    }
}

fn invalid(path: &Path, message: String) -> FaceModelError {
    FaceModelError::InvalidModel {
        path: PathBuf::from(path),
        message,
    }
}

/// Map output tensors to stride slots.
///
/// Prefers names like `score_8` / `bbox_16` / `kps_32`; otherwise falls back to
/// the standard positional layout (scores, then bboxes, then keypoints, each
/// ordered 8/16/32). Returns `None` for an unsupported output count.
fn discover_output_indices(names: &[String]) -> Option<[StrideOutputIndices; 3]> {
    let find = |prefix: &str, stride: usize| {
        let target = format!("{prefix}_{stride}");
        names.iter().position(|n| *n == target)
    };

    let named: Option<Vec<StrideOutputIndices>> = SCRFD_STRIDES
        .iter()
        .map(|&stride| Some((find("score", stride)?, find("bbox", stride)?, find("kps", stride))))
        .collect();

    if let Some(named) = named {
        let has_kps = named.iter().all(|(_, _, k)| k.is_some());
        let no_kps = named.iter().all(|(_, _, k)| k.is_none());
        if has_kps || no_kps {
            return Some([named[0], named[1], named[2]]);
        }
    }

    match names.len() {
        9 => Some([(0, 3, Some(6)), (1, 4, Some(7)), (2, 5, Some(8))]),
        6 => Some([(0, 3, None), (1, 4, None), (2, 5, None)]),
        _ => None,
    }
}

/// Decode the anchors of one stride whose score exceeds `threshold`.
fn decode_stride(
    scores: &[f32],
    bboxes: &[f32],
    kps: Option<&[f32]>,
    stride: usize,
    input_size: usize,
    lb: &Letterbox,
    threshold: f32,
) -> Vec<FaceRegion> {
    let grid = input_size / stride;
    let num_anchors = grid * grid * ANCHORS_PER_CELL;
    let step = stride as f32;

    let mut detections = Vec::new();
    for idx in 0..num_anchors {
        let score = scores.get(idx).copied().unwrap_or(0.0);
        if score <= threshold {
            continue;
        }

        let cell = idx / ANCHORS_PER_CELL;
        let anchor_x = (cell % grid) as f32 * step;
        let anchor_y = (cell / grid) as f32 * step;

        let Some(d) = bboxes.get(idx * 4..idx * 4 + 4) else {
            continue;
        };
        let (x1, y1) = lb.to_source(anchor_x - d[0] * step, anchor_y - d[1] * step);
        let (x2, y2) = lb.to_source(anchor_x + d[2] * step, anchor_y + d[3] * step);

        let mut region = FaceRegion::new(x1, y1, x2 - x1, y2 - y1, score);
        region.landmarks = kps
            .and_then(|k| k.get(idx * 10..idx * 10 + 10))
            .map(|k| {
                std::array::from_fn(|i| {
                    lb.to_source(anchor_x + k[i * 2] * step, anchor_y + k[i * 2 + 1] * step)
                })
            });
        detections.push(region);
    }
    detections
}

/// Greedy non-maximum suppression, highest confidence first.
fn nms(mut detections: Vec<FaceRegion>, iou_threshold: f32) -> Vec<FaceRegion> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<FaceRegion> = Vec::with_capacity(detections.len());
    for det in detections {
        if kept.iter().all(|k| k.iou(&det) <= iou_threshold) {
            kept.push(det);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_discover_named_outputs() {
        let outputs = names(&[
            "kps_8", "score_8", "bbox_8", "score_16", "bbox_16", "kps_16", "score_32", "bbox_32",
            "kps_32",
        ]);
        let idx = discover_output_indices(&outputs).unwrap();
        assert_eq!(idx[0], (1, 2, Some(0)));
        assert_eq!(idx[1], (3, 4, Some(5)));
        assert_eq!(idx[2], (6, 7, Some(8)));
    }

    #[test]
    fn test_discover_positional_fallback() {
        let nine = names(&["448", "471", "494", "451", "474", "497", "454", "477", "500"]);
        assert_eq!(
            discover_output_indices(&nine).unwrap(),
            [(0, 3, Some(6)), (1, 4, Some(7)), (2, 5, Some(8))]
        );

        let six = names(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(
            discover_output_indices(&six).unwrap(),
            [(0, 3, None), (1, 4, None), (2, 5, None)]
        );
    }

    #[test]
    fn test_discover_unsupported_count() {
        assert!(discover_output_indices(&names(&["only", "two"])).is_none());
    }

    #[test]
    fn test_decode_stride_single_anchor() {
        let lb = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
        };
        // 32×32 input, stride 16: 2×2 grid, 8 anchors.
        let mut scores = vec![0.0; 8];
        let mut bboxes = vec![0.0; 32];
        // Anchor 3 -> cell 1 -> grid (x=1, y=0) -> centre (16, 0)
        scores[3] = 0.9;
        bboxes[12..16].copy_from_slice(&[0.5, 0.0, 0.5, 1.0]);

        let dets = decode_stride(&scores, &bboxes, None, 16, 32, &lb, 0.5);
        assert_eq!(dets.len(), 1);
        let d = &dets[0];
        assert!((d.x - 8.0).abs() < 1e-4);
        assert!((d.y - 0.0).abs() < 1e-4);
        assert!((d.width - 16.0).abs() < 1e-4);
        assert!((d.height - 16.0).abs() < 1e-4);
        assert!(d.landmarks.is_none());
    }

    #[test]
    fn test_decode_stride_keypoints_mapped_through_letterbox() {
        let lb = Letterbox {
            scale: 2.0,
            pad_x: 0.0,
            pad_y: 10.0,
        };
        let scores = vec![0.8, 0.0];
        let bboxes = vec![1.0; 8];
        let mut kps = vec![0.0; 20];
        kps[0] = 1.0; // first landmark x offset
        kps[1] = 2.0; // first landmark y offset

        // Stride 8 on an 8×8 input: a single cell.
        let dets = decode_stride(&scores, &bboxes, Some(&kps), 8, 8, &lb, 0.5);
        assert_eq!(dets.len(), 1);
        let lms = dets[0].landmarks.unwrap();
        assert!((lms[0].0 - 4.0).abs() < 1e-4);
        assert!((lms[0].1 - 3.0).abs() < 1e-4);
        assert!((lms[1].1 + 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_decode_stride_below_threshold() {
        let lb = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
        };
        let dets = decode_stride(&[0.5, 0.2], &[1.0; 8], None, 8, 8, &lb, 0.5);
        assert!(dets.is_empty());
    }

    #[test]
    fn test_nms_suppresses_overlaps() {
        let dets = vec![
            FaceRegion::new(0.0, 0.0, 10.0, 10.0, 0.7),
            FaceRegion::new(1.0, 1.0, 10.0, 10.0, 0.9),
            FaceRegion::new(50.0, 50.0, 10.0, 10.0, 0.6),
        ];
        let kept = nms(dets, 0.4);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[1].confidence, 0.6);
    }
}
