// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Resolving model weights to a local path, downloading from the hub on
//! first use

use std::path::PathBuf;

use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use thiserror::Error;
use tracing::info;

/// Where a set of model weights comes from
#[derive(Debug, Clone)]
pub enum WeightsSource {
    HuggingFace {
        repo_id: String,
        filename: String,
        revision: Option<String>,
    },
    LocalFile {
        path: PathBuf,
    },
}

#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("Weights file not found: {0}")]
    NotFound(PathBuf),

    #[error("Hub download failed: {0}")]
    Hub(String),
}

/// Resolve a weights source to a local file path.
///
/// Hub sources download into the local hub cache on first use; repeated
/// calls reuse the cached file. A missing local file is a hard error so
/// startup can abort before serving traffic.
pub fn ensure_weights(source: &WeightsSource) -> Result<PathBuf, WeightsError> {
    match source {
        WeightsSource::LocalFile { path } => {
            if path.exists() {
                Ok(path.clone())
            } else {
                Err(WeightsError::NotFound(path.clone()))
            }
        }
        WeightsSource::HuggingFace {
            repo_id,
            filename,
            revision,
        } => {
            let api = Api::new().map_err(|e| WeightsError::Hub(e.to_string()))?;
            let repo = match revision {
                Some(rev) => api.repo(Repo::with_revision(
                    repo_id.clone(),
                    RepoType::Model,
                    rev.clone(),
                )),
                None => api.model(repo_id.clone()),
            };

            info!("Fetching {} from hub repo {}", filename, repo_id);
            repo.get(filename).map_err(|e| WeightsError::Hub(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_local_file_present() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"weights").unwrap();

        let source = WeightsSource::LocalFile {
            path: file.path().to_path_buf(),
        };
        let resolved = ensure_weights(&source).unwrap();
        assert_eq!(resolved, file.path());
    }

    #[test]
    fn test_local_file_missing() {
        let source = WeightsSource::LocalFile {
            path: PathBuf::from("/nonexistent/weights.onnx"),
        };
        let result = ensure_weights(&source);
        assert!(matches!(result, Err(WeightsError::NotFound(_))));
    }

    #[test]
    #[ignore] // Requires network access to the hub
    fn test_hub_download() {
        let source = WeightsSource::HuggingFace {
            repo_id: "ultralytics/yolov5".to_string(),
            filename: "yolov5s.onnx".to_string(),
            revision: None,
        };
        let resolved = ensure_weights(&source).unwrap();
        assert!(resolved.exists());
    }
}
