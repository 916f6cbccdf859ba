//! The matching pipeline, leaf stages first:
//! - **paths**: normalize and existence-check user paths
//! - **discovery**: list admissible album images
//! - **validate** / **decode**: load one image into memory
//! - **reference**: build the reference embeddings
//! - **compare**: embedding distance and tolerance
//! - **matcher**: per-candidate decision
//! - **sink**: copy matches, count outcomes
//! - **search**: drives a whole run

pub mod compare;
pub mod decode;
pub mod discovery;
pub mod matcher;
pub mod paths;
pub mod reference;
pub mod search;
pub mod sink;
pub mod validate;

pub use compare::{comparator_for, Comparator, CosineDistance, EuclideanDistance};
pub use decode::ImageDecoder;
pub use discovery::{normalize_extension, ImageScanner};
pub use matcher::MatchEngine;
pub use paths::{expand_path, validate_paths};
pub use reference::{ReferenceFace, ReferenceSet};
pub use search::{FaceSearch, SearchEvent, SearchRequest};
pub use sink::{copy_with_metadata, ResultSink};
pub use validate::Validator;
