//! Guided search: album → output → references → tolerance → confirm → run.

use std::path::{Path, PathBuf};
use std::time::Instant;

use console::Style;
use dialoguer::{Confirm, Input, Select};
use facesift_core::config::{DEFAULT_TOLERANCE, MAX_TOLERANCE, MIN_TOLERANCE};
use facesift_core::pipeline::{expand_path, validate_paths, ImageScanner};
use facesift_core::{Config, RunSummary, SearchRequest};

use super::picker;
use super::theme::facesift_theme;
use crate::cli::find::{report, run_search};
use crate::cli::models::check_installed;

pub async fn guided_find(config: &Config) -> anyhow::Result<()> {
    let theme = facesift_theme();
    let warn = Style::new().for_stderr().yellow();
    let dim = Style::new().for_stderr().dim();
    let use_dialogs = picker::dialogs_available();

    // Album: re-prompt until it exists and holds at least one admissible image.
    let scanner = ImageScanner::from_config(&config.scan);
    let (album, found) = loop {
        let Some(album) = prompt_album(&theme, use_dialogs).await? else {
            return Ok(());
        };

        if !album.is_dir() {
            eprintln!(
                "  {}",
                warn.apply_to(format!("Folder not found: {}", album.display()))
            );
            continue;
        }

        let found = scanner.scan(&album).len();
        if found == 0 {
            eprintln!(
                "  {}",
                warn.apply_to(format!(
                    "No {} images in that folder.",
                    scanner.extensions().join("/")
                ))
            );
            continue;
        }
        break (album, found);
    };
    eprintln!(
        "  {}",
        dim.apply_to(format!("Found {found} image(s) in {}", album.display()))
    );

    let Some(output) = prompt_output(&theme, use_dialogs, &album).await? else {
        return Ok(());
    };

    let references = if use_dialogs {
        pick_references(scanner.extensions(), album.parent()).await
    } else {
        prompt_references(&theme)?
    };
    let Some(references) = references else {
        return Ok(());
    };

    let Some(tolerance) = super::handle_interrupt(
        Input::<f32>::with_theme(&theme)
            .with_prompt(format!(
                "Tolerance ({MIN_TOLERANCE} strict to {MAX_TOLERANCE} loose)"
            ))
            .default(DEFAULT_TOLERANCE)
            .validate_with(|value: &f32| check_tolerance(*value))
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    if !check_installed(config).can_search() {
        eprintln!("  {}", warn.apply_to("Face models are not installed."));
        let install = Confirm::with_theme(&theme)
            .with_prompt("Download them now?")
            .default(true)
            .interact_opt()?;
        if !matches!(install, Some(true)) {
            return Ok(());
        }
        super::models::guided_models(config).await?;
        if !check_installed(config).can_search() {
            eprintln!("  Models still missing. Returning to menu.");
            return Ok(());
        }
    }

    let bold = Style::new().for_stderr().bold();
    eprintln!();
    eprintln!(
        "  {}",
        bold.apply_to(format!(
            "Search {found} image(s) for {} reference photo(s)",
            references.len()
        ))
    );
    eprintln!(
        "  {}",
        dim.apply_to(format!(
            "Tolerance: {tolerance} | Output: {}",
            output.display()
        ))
    );
    eprintln!();

    let confirm = Confirm::with_theme(&theme)
        .with_prompt("Start search?")
        .default(true)
        .interact_opt()?;
    if !matches!(confirm, Some(true)) {
        return Ok(());
    }

    let mut request = SearchRequest::new(album, output, references, config);
    request.tolerance = tolerance;

    let started = Instant::now();
    let summary = run_search(request, config.clone()).await?;
    report::print_summary(&summary, started.elapsed());
    print_completion(&summary);

    eprintln!();
    let next = Select::with_theme(&theme)
        .with_prompt("What next?")
        .items(&["Search another album", "Back to main menu"])
        .default(0)
        .interact_opt()?;
    if matches!(next, Some(0)) {
        Box::pin(guided_find(config)).await?;
    }

    Ok(())
}

async fn prompt_album(
    theme: &dialoguer::theme::ColorfulTheme,
    use_dialogs: bool,
) -> anyhow::Result<Option<PathBuf>> {
    if use_dialogs {
        eprintln!("  Select the album folder to search...");
        return Ok(picker::pick_folder("Select album folder", None).await);
    }
    let raw = super::handle_interrupt(
        Input::<String>::with_theme(theme)
            .with_prompt("Album folder to search")
            .interact_text(),
    )?;
    Ok(raw.map(|raw| expand_path(raw.trim())))
}

async fn prompt_output(
    theme: &dialoguer::theme::ColorfulTheme,
    use_dialogs: bool,
    album: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    if use_dialogs {
        eprintln!("  Select the folder that receives the matches...");
        return Ok(picker::pick_folder("Select output folder", album.parent()).await);
    }
    let raw = super::handle_interrupt(
        Input::<String>::with_theme(theme)
            .with_prompt("Copy matches to")
            .default(default_output(album).display().to_string())
            .interact_text(),
    )?;
    Ok(raw.map(|raw| expand_path(raw.trim())))
}

/// Multi-file picker; every selection still goes through path validation.
async fn pick_references(extensions: &[String], start: Option<&Path>) -> Option<Vec<PathBuf>> {
    eprintln!("  Select one or more reference photos of the person...");
    let picked = picker::pick_images("Select reference photos", extensions, start).await;
    let references = validate_paths(picked.iter().map(|p| p.to_string_lossy()));
    if references.is_empty() {
        let warn = Style::new().for_stderr().yellow();
        eprintln!("  {}", warn.apply_to("No reference photos selected."));
        return None;
    }
    Some(references)
}

/// Collect reference photos until a blank entry. `None` if interrupted.
fn prompt_references(
    theme: &dialoguer::theme::ColorfulTheme,
) -> anyhow::Result<Option<Vec<PathBuf>>> {
    let warn = Style::new().for_stderr().yellow();
    let mut references: Vec<PathBuf> = Vec::new();

    loop {
        let prompt = if references.is_empty() {
            "Reference photo of the person".to_string()
        } else {
            format!("Another reference photo ({} so far, blank to finish)", references.len())
        };
        let Some(raw) = super::handle_interrupt(
            Input::<String>::with_theme(theme)
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text(),
        )?
        else {
            return Ok(None);
        };

        let raw = raw.trim();
        if raw.is_empty() {
            if references.is_empty() {
                eprintln!("  {}", warn.apply_to("At least one reference photo is needed."));
                continue;
            }
            return Ok(Some(references));
        }

        match validate_paths([raw]).pop() {
            Some(path) if path.is_file() => {
                if !references.contains(&path) {
                    references.push(path);
                }
            }
            Some(path) => {
                eprintln!(
                    "  {}",
                    warn.apply_to(format!("Not a file: {}", path.display()))
                );
            }
            None => {
                eprintln!("  {}", warn.apply_to(format!("Path not found: {raw}")));
            }
        }
    }
}

/// Tolerance accepted by the interactive prompt.
fn check_tolerance(value: f32) -> Result<(), String> {
    if (MIN_TOLERANCE..=MAX_TOLERANCE).contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Tolerance must be between {MIN_TOLERANCE} and {MAX_TOLERANCE}"
        ))
    }
}

/// `<album>-matches` next to the album folder.
fn default_output(album: &Path) -> PathBuf {
    let name = album
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "album".to_string());
    album.with_file_name(format!("{name}-matches"))
}

fn print_completion(summary: &RunSummary) {
    eprintln!();
    if summary.matched > 0 {
        let done = Style::new().for_stderr().green();
        eprintln!(
            "  {}",
            done.apply_to(format!(
                "Copied {} matching photo(s) to {}",
                summary.matched,
                summary.output_dir.display()
            ))
        );
    } else {
        let warn = Style::new().for_stderr().yellow();
        eprintln!(
            "  {}",
            warn.apply_to("No matching photos found. Try a looser tolerance or other reference photos.")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_bounds_are_inclusive() {
        assert!(check_tolerance(MIN_TOLERANCE).is_ok());
        assert!(check_tolerance(DEFAULT_TOLERANCE).is_ok());
        assert!(check_tolerance(MAX_TOLERANCE).is_ok());
    }

    #[test]
    fn tolerance_outside_range_is_rejected() {
        assert!(check_tolerance(0.39).is_err());
        assert!(check_tolerance(1.01).is_err());
        assert!(check_tolerance(f32::NAN).is_err());
    }

    #[test]
    fn default_output_is_sibling_of_album() {
        assert_eq!(
            default_output(Path::new("/photos/party")),
            PathBuf::from("/photos/party-matches")
        );
    }
}
