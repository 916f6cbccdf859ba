//! Interactive mode: a guided menu for bare `facesift` on a terminal.
//!
//! Every flow ends up in the same search entry point as the positional CLI.

pub mod find;
pub mod models;
pub mod picker;
pub mod theme;

use console::Style;
use dialoguer::Select;
use facesift_core::Config;

/// `Ok(None)` on Ctrl+C so the current flow can unwind quietly.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &[
    "Find photos of someone",
    "Download / manage models",
    "Show configuration",
    "Exit",
];

pub async fn run(config: Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::facesift_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => find::guided_find(&config).await?,
            Some(1) => models::guided_models(&config).await?,
            Some(2) => show_config(&config)?,
            _ => break,
        }
    }

    Ok(())
}

/// Summary of the current settings, with the full TOML on request.
fn show_config(config: &Config) -> anyhow::Result<()> {
    let theme = theme::facesift_theme();
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    loop {
        eprintln!();
        eprintln!("  {}", cyan.apply_to("Current configuration:"));
        eprintln!();

        let config_path = Config::default_path();
        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };

        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Config file:"),
            config_path.display(),
            dim.apply_to(path_note)
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Model dir:"),
            config.model_dir().display()
        );
        eprintln!(
            "    {:<20} {} ({})",
            label.apply_to("Tolerance:"),
            config.matching.tolerance,
            config.matching.metric
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Extensions:"),
            config.scan.extensions.join(", ")
        );
        eprintln!(
            "    {:<20} {} (min confidence: {})",
            label.apply_to("Detector:"),
            config.detection.model,
            config.detection.confidence_threshold
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Recognizer:"),
            config.recognition.model
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Log level:"),
            config.logging.level
        );
        eprintln!();

        let items = &["View full config (TOML)", "Show config file path", "Back"];
        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml() {
                Ok(toml) => {
                    eprintln!();
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!("{toml}");
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!();
                }
                Err(e) => {
                    let err = Style::new().for_stderr().red();
                    eprintln!("  {} Failed to serialize config: {e}", err.apply_to("✗"));
                    eprintln!();
                }
            },
            Some(1) => {
                eprintln!();
                eprintln!("  {}", Config::default_path().display());
                eprintln!();
            }
            _ => break,
        }
    }

    Ok(())
}
