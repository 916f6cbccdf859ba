//! Logging setup.
//!
//! Logs go to stderr so that `--json` output on stdout stays clean.
//! `RUST_LOG` takes precedence over everything else.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive used when `RUST_LOG` is unset.
///
/// ONNX Runtime is chatty at info level, so it is capped at warn unless
/// the user asked for trace output.
fn default_directive(level: &str, verbose: bool) -> String {
    let level = match (verbose, level) {
        (true, "trace") => "trace",
        (true, _) => "debug",
        (false, "trace" | "debug" | "info" | "warn" | "error") => level,
        (false, _) => "info",
    };
    if level == "trace" {
        level.to_string()
    } else {
        format!("{level},ort=warn")
    }
}

pub fn init(level: &str, verbose: bool, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level, verbose)));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section, with CLI overrides.
pub fn init_from_config(config: &facesift_core::Config, verbose: bool, json_logs: bool) {
    let json_format = json_logs || config.logging.format == "json";
    init(&config.logging.level, verbose, json_format);
}
