// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX color classifier
//!
//! Wraps an ONNX Runtime session around the small traffic-light CNN.
//! The model takes a [1, 64, 64, 3] tensor of [0,1] pixel intensities and
//! outputs a 3-way probability vector over {Green, Red, Yellow}.

use std::path::Path;
use std::sync::{Arc, Mutex};

use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tracing::info;

use super::{argmax_color, ClassifierError, ClassifyColor, TrafficLightColor, COLOR_LABELS};
use crate::vision::CLASSIFIER_INPUT_SIZE;

/// ONNX-backed traffic light color classifier
pub struct OnnxColorClassifier {
    /// ONNX Runtime session (sessions need &mut to run)
    session: Arc<Mutex<Session>>,
    /// Input tensor name captured from the model graph
    input_name: String,
}

impl std::fmt::Debug for OnnxColorClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxColorClassifier")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OnnxColorClassifier {
    /// Load classifier weights from disk and validate the output shape by
    /// running a test inference.
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, ClassifierError> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(ClassifierError::LoadFailed(format!(
                "classifier weights not found: {}",
                model_path.display()
            )));
        }

        let mut session = Session::builder()?
            .with_execution_providers([CPUExecutionProvider::default().build()])?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| ClassifierError::LoadFailed("model declares no inputs".to_string()))?;

        // Validate the model outputs one score per color label
        {
            let size = CLASSIFIER_INPUT_SIZE as usize;
            let probe = Array4::<f32>::zeros((1, size, size, 3));
            let outputs = session.run(ort::inputs![
                input_name.as_str() => Value::from_array(probe)?
            ])?;
            let output = outputs[0].try_extract_array::<f32>()?;
            if output.len() != COLOR_LABELS.len() {
                return Err(ClassifierError::UnexpectedShape(output.shape().to_vec()));
            }
        }

        info!("Color classifier session ready (input '{}')", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
        })
    }
}

impl ClassifyColor for OnnxColorClassifier {
    fn classify(&self, input: Array4<f32>) -> Result<TrafficLightColor, ClassifierError> {
        let mut session = self.session.lock().unwrap();
        let outputs = session.run(ort::inputs![
            self.input_name.as_str() => Value::from_array(input)?
        ])?;

        // Extract by index; exported models name the output differently
        let output = outputs[0].try_extract_array::<f32>()?;
        if output.len() != COLOR_LABELS.len() {
            return Err(ClassifierError::UnexpectedShape(output.shape().to_vec()));
        }

        let probs: Vec<f32> = output.iter().copied().collect();
        argmax_color(&probs)
    }
}
