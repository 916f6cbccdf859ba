//! Progress bar and the end-of-run summary, both on stderr.

use std::time::Duration;

use console::Style;
use facesift_core::RunSummary;
use indicatif::{ProgressBar, ProgressStyle};

/// Length is set once the album has been scanned.
pub fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("loading reference faces...");
    pb
}

pub fn print_summary(summary: &RunSummary, elapsed: Duration) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Matched:      {:>8}", summary.matched);
    eprintln!("    Skipped:      {:>8}", summary.skipped);
    if summary.errored > 0 {
        eprintln!("    Errors:       {:>8}", summary.errored);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total());
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Output:       {}", summary.output_dir.display());
    eprintln!("  ====================================");
}

pub fn print_no_reference(requested: usize) {
    let warn = Style::new().for_stderr().yellow();
    eprintln!();
    eprintln!(
        "  {}",
        warn.apply_to(format!(
            "No face found in any of the {requested} reference image(s); nothing to match against."
        ))
    );
    eprintln!("  Use clear, front-facing photos with a single visible face.");
}
