// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect response types

use serde::{Deserialize, Serialize};

use crate::classifier::TrafficLightColor;

/// Response from a successful detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub status: String,
    /// Detected color label ("Green", "Red", or "Yellow")
    pub color: String,
}

impl DetectResponse {
    pub fn success(color: TrafficLightColor) -> Self {
        Self {
            status: "success".to_string(),
            color: color.label().to_string(),
        }
    }
}
