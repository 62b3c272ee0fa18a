// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! API error taxonomy and the uniform failure body
//!
//! Every failure path returns the same opaque JSON body; only the HTTP
//! status code varies. The real cause is logged server-side.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

/// The uniform JSON body returned on every failure path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

impl ErrorResponse {
    /// The opaque body: callers cannot distinguish failure causes from it
    pub fn opaque() -> Self {
        Self {
            status: "failure".to_string(),
            message: "Error".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// Bad or missing upload (absent field, disallowed extension)
    Validation(String),
    /// No traffic light in the image
    DetectionMiss,
    /// Upload bytes could not be decoded as an image
    Decode(String),
    /// Preprocessing or classifier inference failed
    Classification(String),
    /// Catch-all for unexpected failures
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DetectionMiss => StatusCode::BAD_REQUEST,
            ApiError::Decode(_) | ApiError::Classification(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ApiError::DetectionMiss => write!(f, "No traffic light detected"),
            ApiError::Decode(msg) => write!(f, "Decode error: {}", msg),
            ApiError::Classification(msg) => write!(f, "Classification error: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Detail goes to the log only; the body stays opaque
        match &self {
            ApiError::Validation(_) | ApiError::DetectionMiss => warn!("{}", self),
            ApiError::Decode(_) | ApiError::Classification(_) | ApiError::Internal(_) => {
                error!("{}", self)
            }
        }

        (self.status_code(), Json(ErrorResponse::opaque())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::DetectionMiss.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Decode("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Classification("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_opaque_body_serialization() {
        let json = serde_json::to_string(&ErrorResponse::opaque()).unwrap();
        assert_eq!(json, r#"{"status":"failure","message":"Error"}"#);
    }

    #[test]
    fn test_display_carries_detail() {
        let err = ApiError::Validation("missing field".into());
        assert!(err.to_string().contains("missing field"));
    }
}
