// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect endpoint handler

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::{debug, info};

use super::response::DetectResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::detector::first_traffic_light;
use crate::vision::{crop_to_box, decode_image_bytes, has_allowed_extension, preprocess_for_classifier};

/// POST /detect - Detect a traffic light and classify its color
///
/// Accepts a multipart form with a file field named "image" and returns the
/// illuminated color of the first traffic light found.
///
/// # Errors
/// - 400 Bad Request: missing field, disallowed extension, or no traffic
///   light in the image
/// - 500 Internal Server Error: undecodable bytes, classification failure,
///   or any unexpected error
///
/// All failures share the uniform opaque body.
pub async fn detect_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DetectResponse>, ApiError> {
    // 1. Pull the "image" field out of the multipart body
    let mut upload: Option<(Option<String>, axum::body::Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("failed to read upload: {}", e)))?;
            upload = Some((filename, data));
            break;
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError::Validation("missing \"image\" field".to_string()))?;

    // 2. Extension allow-list applies before any decoding
    let filename =
        filename.ok_or_else(|| ApiError::Validation("upload has no filename".to_string()))?;
    if !has_allowed_extension(&filename) {
        return Err(ApiError::Validation(format!(
            "disallowed extension on '{}'",
            filename
        )));
    }

    // 3. Decode
    let (image, image_info) =
        decode_image_bytes(&data).map_err(|e| ApiError::Decode(e.to_string()))?;

    debug!(
        "Decoded upload '{}': {}x{}, {} bytes",
        filename, image_info.width, image_info.height, image_info.size_bytes
    );

    // 4. Detect and select the first traffic light box
    let boxes = state
        .detector
        .detect(&image)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let bbox = first_traffic_light(&boxes)
        .ok_or(ApiError::DetectionMiss)?
        .clone();

    // 5. Crop, preprocess, classify
    let crop = crop_to_box(&image, &bbox);
    let tensor = preprocess_for_classifier(&crop);
    let color = state
        .classifier
        .classify(tensor)
        .map_err(|e| ApiError::Classification(e.to_string()))?;

    info!(
        "Classified traffic light as {} (confidence {:.2}, box {},{} {},{})",
        color, bbox.confidence, bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax
    );

    Ok(Json(DetectResponse::success(color)))
}
