// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Traffic light color classification: label set, decision rule, and the
//! ONNX classifier implementation

pub mod onnx;

pub use onnx::OnnxColorClassifier;

use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fixed label set, in the classifier's output order
pub const COLOR_LABELS: [&str; 3] = ["Green", "Red", "Yellow"];

/// A validated traffic light color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficLightColor {
    Green,
    Red,
    Yellow,
}

impl TrafficLightColor {
    /// Display label matching the classifier's training labels
    pub fn label(&self) -> &'static str {
        match self {
            TrafficLightColor::Green => "Green",
            TrafficLightColor::Red => "Red",
            TrafficLightColor::Yellow => "Yellow",
        }
    }

    /// Map an output index into the fixed label set
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(TrafficLightColor::Green),
            1 => Some(TrafficLightColor::Red),
            2 => Some(TrafficLightColor::Yellow),
            _ => None,
        }
    }
}

impl fmt::Display for TrafficLightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Errors raised while loading or running the classifier
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Failed to load classifier model: {0}")]
    LoadFailed(String),

    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Unexpected classifier output shape: {0:?}")]
    UnexpectedShape(Vec<usize>),
}

/// Seam for color-classification backends.
pub trait ClassifyColor: Send + Sync {
    /// Classify a preprocessed [1, 64, 64, 3] tensor into a color.
    fn classify(&self, input: Array4<f32>) -> Result<TrafficLightColor, ClassifierError>;
}

/// Argmax over a probability vector, indexed into the fixed label set.
///
/// Ties resolve to the lowest index, matching the usual argmax convention.
pub fn argmax_color(probs: &[f32]) -> Result<TrafficLightColor, ClassifierError> {
    if probs.len() != COLOR_LABELS.len() {
        return Err(ClassifierError::UnexpectedShape(vec![probs.len()]));
    }

    let mut best = 0usize;
    for (i, &p) in probs.iter().enumerate() {
        if p > probs[best] {
            best = i;
        }
    }

    TrafficLightColor::from_index(best)
        .ok_or_else(|| ClassifierError::UnexpectedShape(vec![probs.len()]))
}
