//! The default command: `facesift ALBUM OUTPUT REFERENCE...`

pub mod report;
mod setup;

use std::time::Instant;

use clap::{Args, ValueEnum};
use facesift_core::config::DistanceMetric;
use facesift_core::{Config, FaceSearch, PipelineError, RunSummary, SearchEvent, SearchRequest};

pub use setup::prepare_request;

/// Arguments for a search run.
#[derive(Args, Debug, Default)]
pub struct FindArgs {
    /// Folder of photos to search (not recursive)
    #[arg(value_name = "ALBUM", requires = "output")]
    pub album: Option<String>,

    /// Folder that receives copies of the matching photos
    #[arg(value_name = "OUTPUT", requires = "references")]
    pub output: Option<String>,

    /// One or more photos of the person to look for
    #[arg(value_name = "REFERENCE")]
    pub references: Vec<String>,

    /// Maximum embedding distance counted as a match; lower is stricter [default: 0.6]
    #[arg(short, long)]
    pub tolerance: Option<f32>,

    /// File extensions to include, case-insensitive [default: jpg jpeg png bmp gif]
    #[arg(short, long, num_args = 1.., value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Distance used to compare faces
    #[arg(long, value_enum)]
    pub metric: Option<Metric>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    /// 1 - cosine similarity
    Cosine,
    Euclidean,
}

impl From<Metric> for DistanceMetric {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Cosine => DistanceMetric::Cosine,
            Metric::Euclidean => DistanceMetric::Euclidean,
        }
    }
}

/// Execute a search from command-line arguments.
pub async fn execute(args: FindArgs, config: Config) -> anyhow::Result<()> {
    let json = args.json;
    let request = prepare_request(&args, &config)?;
    let started = Instant::now();

    let summary = run_search(request, config).await?;

    report::print_summary(&summary, started.elapsed());
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

/// Load the face models and run one search with a progress bar.
///
/// A run without any usable reference face reports a diagnostic and an empty
/// summary instead of failing.
pub async fn run_search(request: SearchRequest, config: Config) -> anyhow::Result<RunSummary> {
    setup::ensure_models(&config)?;

    let progress = report::create_progress_bar();
    let pb = progress.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        let mut search = FaceSearch::from_config(&config)?;
        let summary = search.run_with_progress(&request, |event| match event {
            SearchEvent::ReferencesLoaded { usable, requested } => {
                pb.set_message(format!("{usable}/{requested} reference face(s)"));
            }
            SearchEvent::CandidatesFound { total } => {
                pb.set_length(total as u64);
                pb.set_message("searching...");
            }
            SearchEvent::Decided {
                candidate,
                decision,
            } => {
                if decision.is_match() {
                    pb.set_message(format!("matched {}", candidate.file_name()));
                }
                pb.inc(1);
            }
        });
        anyhow::Ok((summary, request.output_dir))
    })
    .await??;

    progress.finish_and_clear();

    match outcome {
        (Ok(summary), _) => Ok(summary),
        (Err(PipelineError::NoUsableReference { requested }), output_dir) => {
            report::print_no_reference(requested);
            Ok(RunSummary::empty(output_dir))
        }
        (Err(e), _) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_args_default_is_empty() {
        let args = FindArgs::default();
        assert!(args.album.is_none());
        assert!(args.references.is_empty());
        assert!(args.tolerance.is_none());
        assert!(!args.json);
    }

    #[test]
    fn metric_maps_to_core() {
        assert_eq!(DistanceMetric::from(Metric::Cosine), DistanceMetric::Cosine);
        assert_eq!(
            DistanceMetric::from(Metric::Euclidean),
            DistanceMetric::Euclidean
        );
    }
}
