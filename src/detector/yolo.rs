// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX YOLO detector
//!
//! Wraps an ONNX Runtime session around YOLOv5-family weights:
//! - letterbox preprocessing to a square input
//! - objectness x class-score confidence filtering
//! - per-class non-max suppression
//! - mapping boxes back to original-image pixel coordinates

use std::path::Path;
use std::sync::{Arc, Mutex};

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::{Array4, ArrayView2, Axis, Ix3};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tracing::{debug, info};

use super::{BoundingBox, Detect, DetectorError, COCO_LABELS};

/// Detector inference parameters
#[derive(Debug, Clone)]
pub struct YoloConfig {
    /// Square input resolution
    pub input_size: u32,
    /// Minimum objectness x class-score to keep a candidate
    pub conf_threshold: f32,
    /// IoU threshold for non-max suppression
    pub iou_threshold: f32,
    /// Cap on detections returned per image
    pub max_detections: usize,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
        }
    }
}

/// A raw detection candidate in letterbox pixel space
#[derive(Debug, Clone)]
struct Candidate {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    confidence: f32,
    class_id: usize,
}

impl Candidate {
    fn area(&self) -> f32 {
        (self.x2 - self.x1) * (self.y2 - self.y1)
    }

    fn intersection_area(&self, other: &Candidate) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x2 > x1 && y2 > y1 {
            (x2 - x1) * (y2 - y1)
        } else {
            0.0
        }
    }

    fn iou(&self, other: &Candidate) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Undo the letterbox mapping and clamp to image bounds.
    fn to_bounding_box(&self, scale: f32, dx: u32, dy: u32, orig_w: u32, orig_h: u32) -> BoundingBox {
        let unmap_x = |x: f32| ((x - dx as f32) / scale).clamp(0.0, orig_w as f32);
        let unmap_y = |y: f32| ((y - dy as f32) / scale).clamp(0.0, orig_h as f32);

        BoundingBox {
            label: COCO_LABELS[self.class_id].to_string(),
            confidence: self.confidence,
            xmin: unmap_x(self.x1).round() as u32,
            ymin: unmap_y(self.y1).round() as u32,
            xmax: unmap_x(self.x2).round() as u32,
            ymax: unmap_y(self.y2).round() as u32,
        }
    }
}

/// ONNX-backed YOLO object detector
pub struct YoloDetector {
    /// ONNX Runtime session (sessions need &mut to run)
    session: Arc<Mutex<Session>>,
    /// Input tensor name captured from the model graph
    input_name: String,
    config: YoloConfig,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load detector weights from disk
    ///
    /// # Errors
    /// Returns error if the file is missing or ONNX Runtime cannot build a
    /// session from it.
    pub fn load<P: AsRef<Path>>(model_path: P, config: YoloConfig) -> Result<Self, DetectorError> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(DetectorError::LoadFailed(format!(
                "detector weights not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()?
            .with_execution_providers([CPUExecutionProvider::default().build()])?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(model_path)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| DetectorError::LoadFailed("model declares no inputs".to_string()))?;

        info!("Detector session ready (input '{}')", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            config,
        })
    }

    /// Letterbox the image and fill a normalized NCHW tensor [1, 3, S, S].
    fn preprocess(&self, image: &DynamicImage, scale: f32, dx: u32, dy: u32) -> Array4<f32> {
        let target = self.config.input_size;
        let (orig_w, orig_h) = image.dimensions();

        let new_w = ((orig_w as f32 * scale).round() as u32).max(1);
        let new_h = ((orig_h as f32 * scale).round() as u32).max(1);

        let resized = image
            .resize_exact(new_w, new_h, image::imageops::FilterType::Lanczos3)
            .to_rgb8();

        // Gray padding around the scaled image
        let mut padded = RgbImage::from_pixel(target, target, Rgb([114, 114, 114]));
        for y in 0..new_h.min(target) {
            for x in 0..new_w.min(target) {
                padded.put_pixel(x + dx, y + dy, *resized.get_pixel(x, y));
            }
        }

        let size = target as usize;
        let mut tensor = Array4::zeros((1, 3, size, size));
        for y in 0..size {
            for x in 0..size {
                let pixel = padded.get_pixel(x as u32, y as u32);
                for c in 0..3 {
                    tensor[[0, c, y, x]] = pixel[c] as f32 / 255.0;
                }
            }
        }

        tensor
    }
}

impl Detect for YoloDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<BoundingBox>, DetectorError> {
        let (orig_w, orig_h) = image.dimensions();
        let (scale, dx, dy) = letterbox_params(orig_w, orig_h, self.config.input_size);
        let tensor = self.preprocess(image, scale, dx, dy);

        let mut session = self.session.lock().unwrap();
        let outputs = session.run(ort::inputs![
            self.input_name.as_str() => Value::from_array(tensor)?
        ])?;

        // Extract by index; export pipelines name the output differently
        let output = outputs[0].try_extract_array::<f32>()?;
        let shape = output.shape().to_vec();
        let view = output
            .into_dimensionality::<Ix3>()
            .map_err(|_| DetectorError::UnexpectedShape(shape.clone()))?;

        if view.shape()[2] != 5 + COCO_LABELS.len() {
            return Err(DetectorError::UnexpectedShape(shape));
        }

        let preds = view.index_axis(Axis(0), 0);
        let candidates = decode_predictions(preds, self.config.conf_threshold);
        let kept = non_max_suppression(candidates, self.config.iou_threshold, self.config.max_detections);

        debug!("{} detections after NMS ({}x{} image)", kept.len(), orig_w, orig_h);

        Ok(kept
            .iter()
            .map(|c| c.to_bounding_box(scale, dx, dy, orig_w, orig_h))
            .collect())
    }
}

/// Scale factor and padding offsets mapping the original image into the
/// square letterbox.
fn letterbox_params(orig_w: u32, orig_h: u32, target: u32) -> (f32, u32, u32) {
    if orig_w == 0 || orig_h == 0 {
        return (1.0, 0, 0);
    }

    let scale_w = target as f32 / orig_w as f32;
    let scale_h = target as f32 / orig_h as f32;
    let scale = scale_w.min(scale_h);

    let new_w = ((orig_w as f32 * scale).round() as u32).min(target);
    let new_h = ((orig_h as f32 * scale).round() as u32).min(target);

    (scale, (target - new_w) / 2, (target - new_h) / 2)
}

/// Turn raw prediction rows [cx, cy, w, h, objectness, class scores...]
/// into thresholded candidates.
fn decode_predictions(preds: ArrayView2<'_, f32>, conf_threshold: f32) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for row in preds.outer_iter() {
        let objectness = row[4];
        if objectness < conf_threshold {
            continue;
        }

        let mut class_id = 0usize;
        let mut class_score = f32::MIN;
        for (i, &score) in row.iter().skip(5).enumerate() {
            if score > class_score {
                class_id = i;
                class_score = score;
            }
        }

        let confidence = objectness * class_score;
        if confidence < conf_threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        candidates.push(Candidate {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
            confidence,
            class_id,
        });
    }

    candidates
}

/// Greedy per-class non-max suppression, highest confidence first.
fn non_max_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}
