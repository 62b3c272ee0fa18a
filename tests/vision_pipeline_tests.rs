// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Pipeline tests for the crop -> preprocess -> classify path, using a
//! mock classifier over the real decision rule.

use image::{DynamicImage, Rgb, RgbImage};
use ndarray::Array4;
use traffic_light_node::classifier::{argmax_color, ClassifierError, ClassifyColor, TrafficLightColor};
use traffic_light_node::detector::BoundingBox;
use traffic_light_node::vision::{crop_to_box, preprocess_for_classifier, CLASSIFIER_INPUT_SIZE};

/// Mock classifier returning a fixed probability vector through the real
/// argmax decision rule.
struct FixedProbClassifier {
    probs: [f32; 3],
}

impl ClassifyColor for FixedProbClassifier {
    fn classify(&self, _input: Array4<f32>) -> Result<TrafficLightColor, ClassifierError> {
        argmax_color(&self.probs)
    }
}

fn solid_image(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

#[test]
fn test_solid_red_crop_round_trip() {
    // A uniformly red 64x64 patch through the preprocessor and a mock
    // classifier peaking at index 1 must come out as "Red".
    let crop = solid_image(64, 64, [255, 0, 0]);
    let tensor = preprocess_for_classifier(&crop);
    assert_eq!(tensor.shape(), &[1, 64, 64, 3]);

    let classifier = FixedProbClassifier {
        probs: [0.05, 0.9, 0.05],
    };
    let color = classifier.classify(tensor).unwrap();
    assert_eq!(color, TrafficLightColor::Red);
    assert_eq!(color.label(), "Red");
}

#[test]
fn test_crop_then_preprocess_shape() {
    let image = solid_image(200, 150, [30, 30, 30]);
    let bbox = BoundingBox {
        label: "traffic light".to_string(),
        confidence: 0.8,
        xmin: 50,
        ymin: 20,
        xmax: 80,
        ymax: 100,
    };

    let crop = crop_to_box(&image, &bbox);
    assert_eq!(crop.width(), 30);
    assert_eq!(crop.height(), 80);

    let tensor = preprocess_for_classifier(&crop);
    assert_eq!(
        tensor.shape(),
        &[
            1,
            CLASSIFIER_INPUT_SIZE as usize,
            CLASSIFIER_INPUT_SIZE as usize,
            3
        ]
    );
}

#[test]
fn test_preprocess_values_stay_in_unit_range() {
    let image = solid_image(20, 60, [255, 200, 10]);
    let tensor = preprocess_for_classifier(&image);
    for val in tensor.iter() {
        assert!(*val >= 0.0 && *val <= 1.0, "value {} out of range", val);
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let image = solid_image(100, 100, [200, 40, 40]);
    let bbox = BoundingBox {
        label: "traffic light".to_string(),
        confidence: 0.8,
        xmin: 10,
        ymin: 10,
        xmax: 40,
        ymax: 90,
    };

    let first = preprocess_for_classifier(&crop_to_box(&image, &bbox));
    let second = preprocess_for_classifier(&crop_to_box(&image, &bbox));
    assert_eq!(first, second);
}
