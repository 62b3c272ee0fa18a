// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod models;
pub mod version;
pub mod vision;

// Re-export the types the binary and tests reach for
pub use api::{build_router, start_server, ApiError, AppState, DetectResponse, ErrorResponse};
pub use classifier::{
    argmax_color, ClassifierError, ClassifyColor, OnnxColorClassifier, TrafficLightColor,
    COLOR_LABELS,
};
pub use config::{DetectorConfig, ServiceConfig};
pub use detector::{
    first_traffic_light, BoundingBox, Detect, DetectorError, YoloConfig, YoloDetector,
    TRAFFIC_LIGHT_LABEL,
};
pub use models::{ensure_weights, WeightsError, WeightsSource};
