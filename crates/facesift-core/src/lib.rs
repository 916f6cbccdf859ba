//! Facesift Core - find the photos in an album that show a given person.
//!
//! Reference images are reduced to face embeddings, every image in the album
//! is searched for a face within tolerance of any reference, and matching
//! images are copied to an output directory.
//!
//! ```text
//! References → ReferenceSet ─┐
//! Album → ImageScanner → MatchEngine → ResultSink → RunSummary
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use facesift_core::{Config, FaceSearch, SearchRequest};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let mut search = FaceSearch::from_config(&config)?;
//!     let request = SearchRequest::new(
//!         "/photos/2024".into(),
//!         "/photos/alice".into(),
//!         vec!["/photos/alice.jpg".into()],
//!         &config,
//!     );
//!     let summary = search.run(&request)?;
//!     println!("{} matched", summary.matched);
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod face;
pub mod math;
pub mod pipeline;
pub mod types;

pub use config::{Config, DistanceMetric};
pub use error::{ConfigError, FaceModelError, PipelineError, PipelineResult};
pub use face::{FaceModel, OnnxFaceModel};
pub use pipeline::{FaceSearch, SearchEvent, SearchRequest};
pub use types::{Candidate, FaceEmbedding, FaceRegion, MatchDecision, RunSummary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
