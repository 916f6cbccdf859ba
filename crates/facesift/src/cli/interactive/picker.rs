//! Native folder and file pickers for the guided search.
//!
//! Only used when a desktop session is available; otherwise the guided flow
//! falls back to typed paths.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Whether native dialogs can be shown.
pub fn dialogs_available() -> bool {
    display_present(|key| std::env::var_os(key))
}

fn display_present(lookup: impl Fn(&str) -> Option<OsString>) -> bool {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        return true;
    }
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|key| lookup(key).is_some_and(|v| !v.is_empty()))
}

/// `None` when the dialog is cancelled.
pub async fn pick_folder(title: &str, start: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = rfd::AsyncFileDialog::new().set_title(title);
    if let Some(dir) = start {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_folder().await.map(|h| h.path().to_path_buf())
}

/// Multi-select limited to `extensions`. Empty when cancelled.
pub async fn pick_images(title: &str, extensions: &[String], start: Option<&Path>) -> Vec<PathBuf> {
    let mut dialog = rfd::AsyncFileDialog::new()
        .set_title(title)
        .add_filter("Image files", &filter_extensions(extensions));
    if let Some(dir) = start {
        dialog = dialog.set_directory(dir);
    }
    dialog
        .pick_files()
        .await
        .map(|handles| handles.iter().map(|h| h.path().to_path_buf()).collect())
        .unwrap_or_default()
}

/// Some platform dialogs match filters case-sensitively, so list both cases.
fn filter_extensions(extensions: &[String]) -> Vec<String> {
    let mut all = Vec::with_capacity(extensions.len() * 2);
    for ext in extensions {
        for variant in [ext.to_lowercase(), ext.to_uppercase()] {
            if !all.contains(&variant) {
                all.push(variant);
            }
        }
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_lists_both_cases_once() {
        let exts = vec!["jpg".to_string(), "png".to_string(), "JPG".to_string()];
        assert_eq!(filter_extensions(&exts), vec!["jpg", "JPG", "png", "PNG"]);
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn headless_session_has_no_dialogs() {
        assert!(!display_present(|_| None));
        assert!(!display_present(|_| Some(OsString::new())));
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn x11_or_wayland_enables_dialogs() {
        assert!(display_present(|k| (k == "DISPLAY").then(|| OsString::from(":0"))));
        assert!(display_present(|k| {
            (k == "WAYLAND_DISPLAY").then(|| OsString::from("wayland-0"))
        }));
    }
}
