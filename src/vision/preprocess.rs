// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cropping and classifier-input preprocessing

use image::DynamicImage;
use ndarray::Array4;

use crate::detector::BoundingBox;

/// Fixed spatial resolution the color classifier was trained at
pub const CLASSIFIER_INPUT_SIZE: u32 = 64;

/// Extract the sub-image bounded by a detection box.
///
/// Box coordinates are trusted as produced by the detector, which clamps
/// them to the image bounds when undoing its letterbox mapping.
pub fn crop_to_box(image: &DynamicImage, bbox: &BoundingBox) -> DynamicImage {
    let width = bbox.xmax.saturating_sub(bbox.xmin).max(1);
    let height = bbox.ymax.saturating_sub(bbox.ymin).max(1);
    image.crop_imm(bbox.xmin, bbox.ymin, width, height)
}

/// Preprocess a cropped traffic light for the color classifier
///
/// Steps:
/// 1. Resize to CLASSIFIER_INPUT_SIZE x CLASSIFIER_INPUT_SIZE (direct stretch)
/// 2. Convert to RGB
/// 3. Scale pixel intensities from [0,255] to [0,1]
/// 4. Add a leading batch dimension -> NHWC tensor [1, H, W, 3]
pub fn preprocess_for_classifier(crop: &DynamicImage) -> Array4<f32> {
    let resized = crop.resize_exact(
        CLASSIFIER_INPUT_SIZE,
        CLASSIFIER_INPUT_SIZE,
        image::imageops::FilterType::Lanczos3,
    );
    let rgb = resized.to_rgb8();

    let size = CLASSIFIER_INPUT_SIZE as usize;
    let mut tensor = Array4::zeros((1, size, size, 3));

    for y in 0..size {
        for x in 0..size {
            let pixel = rgb.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                tensor[[0, y, x, c]] = pixel[c] as f32 / 255.0;
            }
        }
    }

    tensor
}
