// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding, cropping, and classifier preprocessing

pub mod image_utils;
pub mod preprocess;

pub use image_utils::{decode_image_bytes, has_allowed_extension, ImageInfo, VisionError};
pub use preprocess::{crop_to_box, preprocess_for_classifier, CLASSIFIER_INPUT_SIZE};
