// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect API endpoint module
//!
//! Provides POST /detect for traffic light detection and color
//! classification.

pub mod handler;
pub mod response;

pub use handler::detect_handler;
pub use response::DetectResponse;
