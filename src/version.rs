// Version information for the Traffic Light Node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-onnx-pipeline-2026-08-23";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2026-08-23";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "traffic-light-detection",
    "color-classification",
    "multipart-upload",
    "onnx-runtime",
    "hub-weights-download",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Traffic Light Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string() {
        let version = get_version_string();
        assert!(version.contains("0.1.0"));
        assert!(version.contains(BUILD_DATE));
    }

    #[test]
    fn test_features_list() {
        assert!(FEATURES.contains(&"traffic-light-detection"));
        assert!(FEATURES.contains(&"color-classification"));
    }
}
