//! Guided model management: show what is installed and offer the download.

use console::Style;
use dialoguer::Select;
use facesift_core::Config;

use super::theme::facesift_theme;
use crate::cli::models::{check_installed, download_models, model_labels, InstalledModels};

pub async fn guided_models(config: &Config) -> anyhow::Result<()> {
    let theme = facesift_theme();

    loop {
        let status = check_installed(config);
        print_status(&status, config);

        let mut items = Vec::new();
        let mut actions = Vec::new();
        if !status.can_search() {
            items.push("Download missing models");
            actions.push(ModelAction::Download);
        }
        items.push("Show model directory");
        actions.push(ModelAction::ShowPath);
        items.push("Back");
        actions.push(ModelAction::Back);

        let selection = Select::with_theme(&theme)
            .with_prompt("Model management")
            .items(&items)
            .default(0)
            .interact_opt()?;

        match selection.map(|idx| &actions[idx]) {
            Some(ModelAction::Download) => {
                let client = reqwest::Client::new();
                match download_models(config, &client).await {
                    Ok(true) => {
                        let done = Style::new().for_stderr().green();
                        eprintln!();
                        eprintln!("{}", done.apply_to("  Downloads complete."));
                    }
                    Ok(false) => {
                        let warn = Style::new().for_stderr().yellow();
                        eprintln!();
                        eprintln!(
                            "{}",
                            warn.apply_to("  Custom models must be copied into the model directory.")
                        );
                    }
                    Err(e) => {
                        let err = Style::new().for_stderr().red();
                        eprintln!("  {} {e:#}", err.apply_to("✗"));
                    }
                }
                eprintln!();
            }
            Some(ModelAction::ShowPath) => {
                eprintln!("  {}", config.model_dir().display());
                eprintln!();
            }
            Some(ModelAction::Back) | None => break,
        }
    }

    Ok(())
}

fn print_status(status: &InstalledModels, config: &Config) {
    let ok = Style::new().for_stderr().green();
    let missing = Style::new().for_stderr().red();
    let dim = Style::new().for_stderr().dim();

    eprintln!();
    eprintln!(
        "  {}",
        dim.apply_to(format!("Model directory: {}", config.model_dir().display()))
    );
    eprintln!();

    let [(detector_label, detector_size), (recognizer_label, recognizer_size)] = model_labels();
    let rows = [
        (status.detector, detector_label, &config.detection.model, detector_size),
        (status.recognizer, recognizer_label, &config.recognition.model, recognizer_size),
    ];
    for (installed, label, file, size) in rows {
        if installed {
            eprintln!(
                "  {} {:<28} {}",
                ok.apply_to("✓"),
                label,
                dim.apply_to(format!("{file} {size}"))
            );
        } else {
            eprintln!(
                "  {} {:<28} {}",
                missing.apply_to("✗"),
                label,
                dim.apply_to("not installed")
            );
        }
    }
    eprintln!();
}

enum ModelAction {
    Download,
    ShowPath,
    Back,
}
