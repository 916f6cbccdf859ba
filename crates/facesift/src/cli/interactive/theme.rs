//! Prompt theme and entry banner for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with cyan prompts, green values and red errors, all on stderr.
pub fn facesift_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().cyan(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

fn banner_lines() -> [String; 4] {
    let version_line = format!("facesift v{}", facesift_core::VERSION);
    let tagline = "find the photos that show a known face";
    let inner_width = tagline.len().max(version_line.len()) + 4;

    [
        format!("  ╔{:═<width$}╗", "", width = inner_width),
        format!("  ║{:^width$}║", version_line, width = inner_width),
        format!("  ║{:^width$}║", tagline, width = inner_width),
        format!("  ╚{:═<width$}╝", "", width = inner_width),
    ]
}

pub fn print_banner() {
    let cyan = Style::new().for_stderr().cyan();

    eprintln!();
    for line in banner_lines() {
        eprintln!("{}", cyan.apply_to(line));
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_rows_line_up() {
        let lines = banner_lines();
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{widths:?}");
        assert!(lines[1].contains(facesift_core::VERSION));
    }
}
