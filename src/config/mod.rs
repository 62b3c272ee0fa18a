// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Environment-driven service configuration

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::models::WeightsSource;

/// Default HTTP port the service listens on
pub const DEFAULT_PORT: u16 = 5000;

/// Default Hugging Face repo the detector weights are fetched from
pub const DEFAULT_DETECTOR_REPO: &str = "ultralytics/yolov5";

/// Default detector weights filename inside the hub repo
pub const DEFAULT_DETECTOR_FILE: &str = "yolov5s.onnx";

/// Fixed local filename the color classifier is read from
pub const DEFAULT_CLASSIFIER_PATH: &str = "./models/traffic_light_cnn_model.onnx";

/// Detector acquisition and postprocessing settings
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Hub repo id (e.g. "ultralytics/yolov5")
    pub repo_id: String,
    /// Weights filename inside the repo
    pub filename: String,
    /// Optional repo revision (branch, tag, or commit)
    pub revision: Option<String>,
    /// Local weights path; when set, no hub download is attempted
    pub local_path: Option<PathBuf>,
    /// Confidence threshold applied during postprocessing
    pub conf_threshold: f32,
    /// IoU threshold for non-max suppression
    pub iou_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            repo_id: DEFAULT_DETECTOR_REPO.to_string(),
            filename: DEFAULT_DETECTOR_FILE.to_string(),
            revision: None,
            local_path: None,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Interface to bind (all interfaces by default)
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Detector settings
    pub detector: DetectorConfig,
    /// Path to the color-classifier ONNX weights
    pub classifier_path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            detector: DetectorConfig::default(),
            classifier_path: PathBuf::from(DEFAULT_CLASSIFIER_PATH),
        }
    }
}

impl ServiceConfig {
    /// Build configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let conf_threshold = env::var("DETECTOR_CONF_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(defaults.detector.conf_threshold);

        let iou_threshold = env::var("DETECTOR_IOU_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(defaults.detector.iou_threshold);

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            detector: DetectorConfig {
                repo_id: env::var("DETECTOR_REPO").unwrap_or(defaults.detector.repo_id),
                filename: env::var("DETECTOR_FILE").unwrap_or(defaults.detector.filename),
                revision: env::var("DETECTOR_REVISION").ok(),
                local_path: env::var("DETECTOR_PATH").ok().map(PathBuf::from),
                conf_threshold,
                iou_threshold,
            },
            classifier_path: env::var("CLASSIFIER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.classifier_path),
        }
    }

    /// Where the detector weights come from
    pub fn detector_source(&self) -> WeightsSource {
        match &self.detector.local_path {
            Some(path) => WeightsSource::LocalFile { path: path.clone() },
            None => WeightsSource::HuggingFace {
                repo_id: self.detector.repo_id.clone(),
                filename: self.detector.filename.clone(),
                revision: self.detector.revision.clone(),
            },
        }
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse::<SocketAddr>()?)
    }
}
