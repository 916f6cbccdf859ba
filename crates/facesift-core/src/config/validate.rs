//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    ///
    /// Called on load and again by the CLI after flag overrides are applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.matching.tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "matching.tolerance must be a positive number, got {tolerance}"
            )));
        }
        if self.scan.extensions.iter().all(|ext| ext.trim_start_matches('.').is_empty()) {
            return Err(ConfigError::ValidationError(
                "scan.extensions must list at least one extension".into(),
            ));
        }
        if self.detection.input_size == 0 || self.detection.input_size % 32 != 0 {
            return Err(ConfigError::ValidationError(
                "detection.input_size must be a positive multiple of 32".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.confidence_threshold) {
            return Err(ConfigError::ValidationError(
                "detection.confidence_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.nms_threshold) {
            return Err(ConfigError::ValidationError(
                "detection.nms_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.detection.intra_threads == 0 || self.recognition.intra_threads == 0 {
            return Err(ConfigError::ValidationError(
                "intra_threads must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_tolerance() {
        let mut config = Config::default();
        config.matching.tolerance = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tolerance"));

        config.matching.tolerance = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_tolerance_outside_nominal_range() {
        // The nominal range only constrains the interactive prompt.
        let mut config = Config::default();
        config.matching.tolerance = 1.2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = Config::default();
        config.scan.extensions = vec![".".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scan.extensions"));
    }

    #[test]
    fn test_validate_rejects_bad_input_size() {
        let mut config = Config::default();
        config.detection.input_size = 600;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("input_size"));
    }

    #[test]
    fn test_validate_rejects_invalid_thresholds() {
        let mut config = Config::default();
        config.detection.confidence_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));

        let mut config = Config::default();
        config.detection.nms_threshold = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("nms_threshold"));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.limits.max_image_dimension = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_image_dimension"));
    }
}
