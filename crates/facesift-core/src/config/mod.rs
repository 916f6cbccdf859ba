//! Configuration management for Facesift.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a missing file or a
//! partial file both work.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Facesift.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Match decision settings
    pub matching: MatchingConfig,

    /// Album scanning settings
    pub scan: ScanConfig,

    /// Face detector settings
    pub detection: DetectionConfig,

    /// Face recognizer settings
    pub recognition: RecognitionConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.facesift.facesift/config.toml
    /// - Linux: ~/.config/facesift/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\facesift\config\config.toml
    ///
    /// Falls back to ~/.facesift/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "facesift", "facesift")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".facesift").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        let path_str = self.general.model_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Full path of the SCRFD detector model.
    pub fn detector_path(&self) -> PathBuf {
        self.model_dir().join(&self.detection.model)
    }

    /// Full path of the ArcFace recognizer model.
    pub fn recognizer_path(&self) -> PathBuf {
        self.model_dir().join(&self.recognition.model)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!((config.matching.tolerance - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.matching.metric, DistanceMetric::Cosine);
        assert_eq!(
            config.scan.extensions,
            vec!["jpg", "jpeg", "png", "bmp", "gif"]
        );
        assert_eq!(config.limits.max_file_size_mb, 100);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[matching]"));
        assert!(toml.contains("metric = \"cosine\""));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [matching]
            tolerance = 0.5
            metric = "euclidean"
            "#,
        )
        .unwrap();
        assert!((config.matching.tolerance - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.matching.metric, DistanceMetric::Euclidean);
        assert_eq!(config.detection.input_size, 640);
        assert_eq!(config.scan.extensions.len(), 5);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching]\ntolerance = -1.0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn test_model_paths_join_model_dir() {
        let mut config = Config::default();
        config.general.model_dir = PathBuf::from("/opt/models");
        assert_eq!(
            config.detector_path(),
            PathBuf::from("/opt/models/scrfd_500m_bnkps.onnx")
        );
        assert_eq!(
            config.recognizer_path(),
            PathBuf::from("/opt/models/w600k_r50.onnx")
        );
    }
}
