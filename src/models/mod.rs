// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model weights acquisition

pub mod downloading;

pub use downloading::{ensure_weights, WeightsError, WeightsSource};
