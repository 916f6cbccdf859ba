//! Turn command-line arguments into a validated search request.

use facesift_core::config::{MAX_TOLERANCE, MIN_TOLERANCE};
use facesift_core::pipeline::{expand_path, normalize_extension, validate_paths};
use facesift_core::{Config, OnnxFaceModel, SearchRequest};

use super::FindArgs;

/// Apply CLI overrides to the configured defaults and normalize every path.
///
/// The overridden settings go through the same validation as the config
/// file. Missing reference images are dropped with a warning. A missing album
/// is reported and left to the scan, which yields no candidates.
pub fn prepare_request(args: &FindArgs, config: &Config) -> anyhow::Result<SearchRequest> {
    let (Some(album), Some(output)) = (&args.album, &args.output) else {
        anyhow::bail!("Usage: facesift ALBUM OUTPUT REFERENCE... (see --help)");
    };

    let effective = with_overrides(args, config);
    effective.validate()?;

    let tolerance = effective.matching.tolerance;
    if !(MIN_TOLERANCE..=MAX_TOLERANCE).contains(&tolerance) {
        tracing::warn!(
            tolerance,
            "Tolerance is outside the usual range [{MIN_TOLERANCE}, {MAX_TOLERANCE}]"
        );
    }

    let album_dir = expand_path(album);
    if !album_dir.is_dir() {
        tracing::warn!(path = %album_dir.display(), "Album folder does not exist");
    }

    let references = validate_paths(&args.references);
    let request = SearchRequest::new(album_dir, expand_path(output), references, &effective);

    tracing::debug!(?request, "Prepared search");
    Ok(request)
}

/// `config` with the matching and scan flags applied for this run.
fn with_overrides(args: &FindArgs, config: &Config) -> Config {
    let mut effective = config.clone();
    if let Some(tolerance) = args.tolerance {
        effective.matching.tolerance = tolerance;
    }
    if let Some(metric) = args.metric {
        effective.matching.metric = metric.into();
    }
    if let Some(extensions) = &args.extensions {
        effective.scan.extensions = extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();
    }
    effective
}

/// Fail early with a hint when the ONNX models have not been downloaded.
pub fn ensure_models(config: &Config) -> anyhow::Result<()> {
    if !OnnxFaceModel::models_exist(config) {
        anyhow::bail!(
            "Face models not found in {}\n\n  Hint: Run `facesift models download` first.",
            config.model_dir().display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::find::Metric;
    use facesift_core::config::DistanceMetric;

    fn args_for(album: &std::path::Path, refs: Vec<String>) -> FindArgs {
        FindArgs {
            album: Some(album.to_string_lossy().into_owned()),
            output: Some(album.join("out").to_string_lossy().into_owned()),
            references: refs,
            ..FindArgs::default()
        }
    }

    #[test]
    fn defaults_come_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let request = prepare_request(&args_for(dir.path(), vec![]), &Config::default()).unwrap();
        assert_eq!(request.tolerance, 0.6);
        assert_eq!(request.metric, DistanceMetric::Cosine);
        assert_eq!(request.extensions.len(), 5);
        assert!(request.output_dir.is_absolute());
    }

    #[test]
    fn overrides_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_for(dir.path(), vec![]);
        args.tolerance = Some(0.45);
        args.extensions = Some(vec![".JPG".into(), "webp".into()]);
        args.metric = Some(Metric::Euclidean);

        let request = prepare_request(&args, &Config::default()).unwrap();
        assert_eq!(request.tolerance, 0.45);
        assert_eq!(request.extensions, vec!["jpg", "webp"]);
        assert_eq!(request.metric, DistanceMetric::Euclidean);
    }

    #[test]
    fn missing_references_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("me.jpg");
        std::fs::write(&present, b"x").unwrap();
        let args = args_for(
            dir.path(),
            vec![
                present.to_string_lossy().into_owned(),
                dir.path().join("gone.jpg").to_string_lossy().into_owned(),
            ],
        );

        let request = prepare_request(&args, &Config::default()).unwrap();
        assert_eq!(request.references, vec![present]);
    }

    #[test]
    fn missing_album_still_prepares_request() {
        let dir = tempfile::tempdir().unwrap();
        let album = dir.path().join("nope");
        let request = prepare_request(&args_for(&album, vec![]), &Config::default()).unwrap();
        assert_eq!(request.album_dir, album);
    }

    #[test]
    fn non_positive_tolerance_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_for(dir.path(), vec![]);
        args.tolerance = Some(0.0);
        let err = prepare_request(&args, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("matching.tolerance"), "{err}");
    }

    #[test]
    fn overridden_config_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_for(dir.path(), vec![]);
        args.extensions = Some(vec![".".into()]);
        let err = prepare_request(&args, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("scan.extensions"), "{err}");

        let mut config = Config::default();
        config.detection.input_size = 600;
        let err = prepare_request(&args_for(dir.path(), vec![]), &config).unwrap_err();
        assert!(err.to_string().contains("input_size"), "{err}");
    }

    #[test]
    fn ensure_models_reports_hint() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.model_dir = dir.path().to_path_buf();
        let err = ensure_models(&config).unwrap_err();
        assert!(err.to_string().contains("facesift models download"));
    }
}
