// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection: bounding boxes, the detection seam, and the ONNX
//! YOLO implementation

pub mod labels;
pub mod yolo;

pub use labels::COCO_LABELS;
pub use yolo::{YoloConfig, YoloDetector};

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Class label of the detection the pipeline cares about
pub const TRAFFIC_LIGHT_LABEL: &str = "traffic light";

/// A labeled detection in original-image pixel coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Object label/class
    pub label: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    pub xmin: u32,
    pub ymin: u32,
    pub xmax: u32,
    pub ymax: u32,
}

/// Errors raised while loading or running the detector
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Failed to load detector model: {0}")]
    LoadFailed(String),

    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Detector inference failed: {0}")]
    InferenceFailed(String),

    #[error("Unexpected detector output shape: {0:?}")]
    UnexpectedShape(Vec<usize>),
}

/// Seam for object-detection backends.
///
/// The HTTP layer only depends on this trait, so tests can inject a
/// scripted detector instead of a real ONNX session.
pub trait Detect: Send + Sync {
    /// Run inference on a decoded image and return all detections.
    fn detect(&self, image: &DynamicImage) -> Result<Vec<BoundingBox>, DetectorError>;
}

/// Select the first traffic-light box in the detector's output order.
///
/// No re-ranking by confidence or area is performed beyond the detector's
/// own postprocessing.
pub fn first_traffic_light(boxes: &[BoundingBox]) -> Option<&BoundingBox> {
    boxes.iter().find(|b| b.label == TRAFFIC_LIGHT_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_box(label: &str, confidence: f32, xmin: u32) -> BoundingBox {
        BoundingBox {
            label: label.to_string(),
            confidence,
            xmin,
            ymin: 0,
            xmax: xmin + 10,
            ymax: 10,
        }
    }

    #[test]
    fn test_first_traffic_light_skips_other_labels() {
        let boxes = vec![
            make_box("car", 0.99, 0),
            make_box("traffic light", 0.4, 20),
            make_box("traffic light", 0.9, 40),
        ];
        let selected = first_traffic_light(&boxes).unwrap();
        // First match in output order wins, even at lower confidence
        assert_eq!(selected.xmin, 20);
        assert!((selected.confidence - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_first_traffic_light_none() {
        let boxes = vec![make_box("car", 0.99, 0), make_box("person", 0.8, 20)];
        assert!(first_traffic_light(&boxes).is_none());
    }

    #[test]
    fn test_first_traffic_light_empty() {
        assert!(first_traffic_light(&[]).is_none());
    }

    #[test]
    fn test_bounding_box_serialization() {
        let bbox = make_box("traffic light", 0.75, 5);
        let json = serde_json::to_string(&bbox).unwrap();
        assert!(json.contains("\"label\":\"traffic light\""));
        assert!(json.contains("\"xmin\":5"));
    }
}
