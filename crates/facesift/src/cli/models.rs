//! The `facesift models` command for managing the face models.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use facesift_core::checksum::content_hash;
use facesift_core::config::{DetectionConfig, RecognitionConfig};
use facesift_core::Config;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download the face detector and recognizer
    Download,

    /// List installed models
    List,

    /// Show model directory path
    Path,
}

/// A downloadable model with its mirrors, tried in order.
struct ModelSource {
    label: &'static str,
    file_name: &'static str,
    size_hint: &'static str,
    urls: &'static [&'static str],
}

const DETECTOR: ModelSource = ModelSource {
    label: "Face detector (SCRFD)",
    file_name: "scrfd_500m_bnkps.onnx",
    size_hint: "~2.5 MB",
    urls: &[
        "https://huggingface.co/ykk648/face_lib/resolve/main/face_detect/scrfd_onnx/scrfd_500m_bnkps.onnx",
        "https://github.com/deepinsight/insightface/releases/download/v0.7/scrfd_500m_bnkps.onnx",
    ],
};

const RECOGNIZER: ModelSource = ModelSource {
    label: "Face recognizer (ArcFace)",
    file_name: "w600k_r50.onnx",
    size_hint: "~174 MB",
    urls: &["https://huggingface.co/maze/faceX/resolve/e010b5098c3685fd00b22dd2aec6f37320e3d850/w600k_r50.onnx"],
};

// ── Reusable public API (used by both flag-based CLI and interactive module) ──

/// Status of each model file on disk.
pub struct InstalledModels {
    pub detector: bool,
    pub recognizer: bool,
}

impl InstalledModels {
    /// Both models are required for a search.
    pub fn can_search(&self) -> bool {
        self.detector && self.recognizer
    }
}

pub fn check_installed(config: &Config) -> InstalledModels {
    InstalledModels {
        detector: config.detector_path().exists(),
        recognizer: config.recognizer_path().exists(),
    }
}

/// What a download pass left on disk for one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    Present,
    Downloaded,
    /// The configured file name has no download source
    NeedsManualInstall,
}

/// Download whichever models are missing. Present files are left alone.
///
/// Returns `true` when both models are in place afterwards.
pub async fn download_models(config: &Config, client: &reqwest::Client) -> anyhow::Result<bool> {
    let model_dir = config.model_dir();
    tokio::fs::create_dir_all(&model_dir).await?;

    let detection: &DetectionConfig = &config.detection;
    let recognition: &RecognitionConfig = &config.recognition;

    let detector = download_one(
        client,
        &DETECTOR,
        &detection.model,
        &config.detector_path(),
        detection.checksum.as_deref(),
    )
    .await?;
    let recognizer = download_one(
        client,
        &RECOGNIZER,
        &recognition.model,
        &config.recognizer_path(),
        recognition.checksum.as_deref(),
    )
    .await?;

    Ok([detector, recognizer]
        .iter()
        .all(|status| *status != ModelStatus::NeedsManualInstall))
}

async fn download_one(
    client: &reqwest::Client,
    source: &ModelSource,
    configured_name: &str,
    dest: &Path,
    expected_blake3: Option<&str>,
) -> anyhow::Result<ModelStatus> {
    if dest.exists() {
        tracing::info!("{} already exists at {:?}", source.label, dest);
        return Ok(ModelStatus::Present);
    }

    if configured_name != source.file_name {
        tracing::warn!(
            "{} is configured as {configured_name:?}, which has no download source. \
             Place the file at {:?} manually.",
            source.label,
            dest
        );
        return Ok(ModelStatus::NeedsManualInstall);
    }

    let mut last_error = None;
    for url in source.urls {
        tracing::info!("Downloading {}...", source.label);
        tracing::info!("  Source: {}", url);
        tracing::info!("  Destination: {:?}", dest);

        match download_file(client, url, dest, expected_blake3).await {
            Ok(()) => {
                let file_size = tokio::fs::metadata(dest).await?.len();
                tracing::info!(
                    "  {} complete ({:.1} MB)",
                    source.label,
                    file_size as f64 / (1024.0 * 1024.0)
                );
                return Ok(ModelStatus::Downloaded);
            }
            Err(e) => {
                tracing::warn!("  Download from {url} failed: {e}");
                last_error = Some(e);
            }
        }
    }

    // Leftover from the last failed mirror.
    let partial = partial_path(dest);
    if let Err(e) = tokio::fs::remove_file(&partial).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!("  Could not remove {:?}: {e}", partial);
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("No download source for {}", source.label)))
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::Download => {
            let client = reqwest::Client::new();
            if download_models(config, &client).await? {
                tracing::info!("All downloads complete.");
            } else {
                tracing::warn!(
                    "Some models must be installed manually into {:?}",
                    config.model_dir()
                );
            }
        }

        ModelsCommand::List => {
            let model_dir = config.model_dir();

            if !model_dir.exists() {
                println!("No models installed.");
                println!("Run `facesift models download` to download required models.");
                return Ok(());
            }

            println!("Installed models:");
            println!("  Directory: {}\n", model_dir.display());

            let status = check_installed(config);
            for (source, name, installed) in [
                (&DETECTOR, &config.detection.model, status.detector),
                (&RECOGNIZER, &config.recognition.model, status.recognizer),
            ] {
                let state = if installed { "ready" } else { "not installed" };
                println!("  - {:28} {:24} {}", source.label, name, state);
            }
        }

        ModelsCommand::Path => {
            println!("{}", config.model_dir().display());
        }
    }

    Ok(())
}

/// Human-readable size hints for the interactive status screen.
pub fn model_labels() -> [(&'static str, &'static str); 2] {
    [
        (DETECTOR.label, DETECTOR.size_hint),
        (RECOGNIZER.label, RECOGNIZER.size_hint),
    ]
}

/// Stream a URL to disk through a `.part` file, renamed into place when complete.
///
/// If `expected_blake3` is provided, the file is verified before the rename.
async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    expected_blake3: Option<&str>,
) -> anyhow::Result<()> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Download failed: {e}"))?;

    let total_size = response.content_length();
    if let Some(size) = total_size {
        tracing::info!("  Size: {:.1} MB", size as f64 / (1024.0 * 1024.0));
    }

    let partial = partial_path(dest);
    let mut file = tokio::fs::File::create(&partial).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(total) = total_size {
            if downloaded % (25 * 1024 * 1024) < chunk.len() as u64 {
                tracing::info!(
                    "  Progress: {:.0}%",
                    downloaded as f64 / total as f64 * 100.0
                );
            }
        }
    }

    file.flush().await?;
    drop(file);

    if let Some(expected) = expected_blake3 {
        verify_blake3(&partial, expected)?;
    }

    tokio::fs::rename(&partial, dest).await?;
    Ok(())
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Verify a downloaded file's BLAKE3 checksum.
///
/// On mismatch, removes the corrupt file so the next run re-downloads.
fn verify_blake3(path: &Path, expected: &str) -> anyhow::Result<()> {
    let actual = content_hash(path)
        .map_err(|e| anyhow::anyhow!("Checksum computation failed for {}: {e}", path.display()))?;

    if !actual.eq_ignore_ascii_case(expected) {
        let _ = std::fs::remove_file(path);
        anyhow::bail!(
            "Checksum mismatch for {}:\n  expected: {}\n  actual:   {}\n\
             Corrupt file removed, try downloading again.",
            path.display(),
            expected,
            actual
        );
    }

    tracing::debug!("  Checksum verified: {}…", &actual[..16]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_file(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn verify_blake3_correct_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_file(&dir, "ok.onnx", b"hello facesift");
        let expected = content_hash(&path).unwrap();

        assert!(verify_blake3(&path, &expected.to_uppercase()).is_ok());
        assert!(path.exists(), "file should still exist after successful verify");
    }

    #[test]
    fn verify_blake3_wrong_hash_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_file(&dir, "bad.onnx", b"hello facesift");
        let wrong_hash = "0000000000000000000000000000000000000000000000000000000000000000";

        let err = verify_blake3(&path, wrong_hash).unwrap_err().to_string();
        assert!(err.contains("Checksum mismatch"), "{err}");
        assert!(err.contains("Corrupt file removed"), "{err}");
        assert!(!path.exists(), "corrupt file should be deleted");
    }

    #[test]
    fn verify_blake3_missing_file() {
        let result = verify_blake3(
            Path::new("/nonexistent/file.onnx"),
            "0000000000000000000000000000000000000000000000000000000000000000",
        );
        assert!(result.is_err());
    }

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/models/w600k_r50.onnx")),
            PathBuf::from("/models/w600k_r50.onnx.part")
        );
    }

    #[test]
    fn default_model_names_have_sources() {
        let config = Config::default();
        assert_eq!(config.detection.model, DETECTOR.file_name);
        assert_eq!(config.recognition.model, RECOGNIZER.file_name);
    }

    const UNREACHABLE: ModelSource = ModelSource {
        label: "Test model",
        file_name: "test.onnx",
        size_hint: "0 MB",
        urls: &["http://127.0.0.1:9/test.onnx"],
    };

    #[tokio::test]
    async fn failed_download_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("test.onnx");
        std::fs::write(partial_path(&dest), b"truncated").unwrap();

        let client = reqwest::Client::new();
        let result = download_one(&client, &UNREACHABLE, "test.onnx", &dest, None).await;

        assert!(result.is_err());
        assert!(!partial_path(&dest).exists());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn unknown_model_name_needs_manual_install() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("custom.onnx");

        let client = reqwest::Client::new();
        let status = download_one(&client, &UNREACHABLE, "custom.onnx", &dest, None)
            .await
            .unwrap();
        assert_eq!(status, ModelStatus::NeedsManualInstall);
    }

    #[tokio::test]
    async fn present_models_report_complete() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.model_dir = dir.path().to_path_buf();
        std::fs::write(config.detector_path(), b"x").unwrap();
        std::fs::write(config.recognizer_path(), b"x").unwrap();

        let client = reqwest::Client::new();
        assert!(download_models(&config, &client).await.unwrap());
    }

    #[tokio::test]
    async fn custom_model_without_file_is_not_complete() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.model_dir = dir.path().to_path_buf();
        config.detection.model = "custom_det.onnx".into();
        std::fs::write(config.recognizer_path(), b"x").unwrap();

        let client = reqwest::Client::new();
        assert!(!download_models(&config, &client).await.unwrap());
    }

    #[test]
    fn check_installed_reflects_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.model_dir = dir.path().to_path_buf();
        assert!(!check_installed(&config).can_search());

        std::fs::write(config.detector_path(), b"x").unwrap();
        let status = check_installed(&config);
        assert!(status.detector && !status.recognizer);

        std::fs::write(config.recognizer_path(), b"x").unwrap();
        assert!(check_installed(&config).can_search());
    }
}
