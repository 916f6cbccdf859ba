//! Normalization and existence filtering of user-supplied paths.

use std::path::{Path, PathBuf};

/// Expand a leading `~` and resolve to an absolute path.
///
/// The path is not required to exist.
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw).as_ref());
    absolutize(&expanded)
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Keep the inputs that exist after expansion, in input order.
///
/// Missing paths are dropped with a warning rather than failing the call.
pub fn validate_paths<I, S>(raw: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|raw| {
            let raw = raw.as_ref();
            let path = expand_path(raw);
            if path.exists() {
                Some(path)
            } else {
                tracing::warn!(path = %path.display(), input = raw, "Path does not exist, skipping");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_is_absolute() {
        assert!(expand_path("relative/photo.jpg").is_absolute());
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/photos");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("photos"));
    }

    #[test]
    fn test_validate_paths_filters_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();
        let missing = dir.path().join("missing.jpg");

        let inputs = [
            b.to_string_lossy().into_owned(),
            missing.to_string_lossy().into_owned(),
            a.to_string_lossy().into_owned(),
        ];
        let valid = validate_paths(&inputs);
        assert_eq!(valid, vec![b, a]);
    }

    #[test]
    fn test_validate_paths_all_missing() {
        let valid = validate_paths(["/nonexistent/one", "/nonexistent/two"]);
        assert!(valid.is_empty());
    }
}
