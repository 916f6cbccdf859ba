//! Album scanning: the files directly inside a directory whose extension is
//! in the allow-list.

use std::path::Path;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::types::Candidate;

/// Enumerates candidate images in a single directory (non-recursive).
#[derive(Debug, Clone)]
pub struct ImageScanner {
    /// Lowercase, without leading dot
    extensions: Vec<String>,
}

impl ImageScanner {
    /// Extensions are matched case-insensitively; a leading dot is ignored.
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        let extensions = extensions
            .iter()
            .map(|e| normalize_extension(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(&config.extensions)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// List admissible files in `dir`, sorted by file name.
    ///
    /// An unreadable or missing directory is reported and yields no candidates.
    pub fn scan(&self, dir: &Path) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    tracing::warn!(path = %dir.display(), error = %e, "Cannot read album directory");
                    return Vec::new();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(extension) = self.admit(entry.path()) {
                candidates.push(Candidate::new(entry.into_path(), extension));
            }
        }

        candidates.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

        if candidates.is_empty() {
            tracing::warn!(
                path = %dir.display(),
                extensions = ?self.extensions,
                "No images with allowed extensions found"
            );
        } else {
            tracing::debug!(path = %dir.display(), count = candidates.len(), "Scanned album");
        }
        candidates
    }

    /// The normalized extension when `path` is admissible.
    fn admit(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        self.extensions.contains(&ext).then_some(ext)
    }
}

impl Default for ImageScanner {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

/// `".JPG"` -> `"jpg"`
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}
