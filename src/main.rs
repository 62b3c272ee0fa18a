// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use std::{env, sync::Arc};
use traffic_light_node::{
    api::{start_server, AppState},
    classifier::OnnxColorClassifier,
    config::ServiceConfig,
    detector::{YoloConfig, YoloDetector},
    models::ensure_weights,
    version,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    tracing::info!("🚦 Starting {}", version::get_version_string());

    let config = ServiceConfig::from_env();

    // Both models load before the listener binds; a failure here aborts
    // startup and the process serves no traffic.
    let detector_weights = ensure_weights(&config.detector_source())
        .context("detector weights unavailable")?;
    let detector = YoloDetector::load(
        &detector_weights,
        YoloConfig {
            conf_threshold: config.detector.conf_threshold,
            iou_threshold: config.detector.iou_threshold,
            ..YoloConfig::default()
        },
    )
    .context("failed to load detector")?;
    tracing::info!("✅ Detector loaded from {}", detector_weights.display());

    let classifier = OnnxColorClassifier::load(&config.classifier_path)
        .context("failed to load color classifier")?;
    tracing::info!(
        "✅ Color classifier loaded from {}",
        config.classifier_path.display()
    );

    let state = AppState::new(Arc::new(detector), Arc::new(classifier));
    let addr = config.socket_addr()?;

    start_server(addr, state).await
}
