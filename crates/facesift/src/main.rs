//! facesift: copy every photo in an album that shows a known face.
//!
//! # Usage
//!
//! ```bash
//! # Search an album using two reference photos
//! facesift ~/Pictures/party ~/Pictures/alice alice1.jpg alice2.jpg
//!
//! # Stricter matching, PNG only
//! facesift ./album ./out ./me.jpg --tolerance 0.45 --extensions png
//!
//! # Guided mode
//! facesift
//!
//! # Fetch the face models
//! facesift models download
//! ```

use clap::{CommandFactory, Parser, Subcommand};

mod cli;
mod logging;

/// Find the photos in an album that contain a known face.
#[derive(Parser, Debug)]
#[command(name = "facesift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    find: cli::find::FindArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the face models (download, list, path)
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't up yet, so config warnings go straight to stderr.
    let config = match facesift_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `facesift config path`."
            );
            facesift_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("facesift v{}", facesift_core::VERSION);

    match cli.command {
        Some(Commands::Models(args)) => cli::models::execute(args, &config).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if cli.find.album.is_some() => cli::find::execute(cli.find, config).await,
        None if console::user_attended() => cli::interactive::run(config).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
