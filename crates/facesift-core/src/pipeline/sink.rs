//! Copies matched images into the output directory and tallies outcomes.

use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Candidate, MatchDecision, RunSummary};

/// Receives one decision per candidate, in scan order.
#[derive(Debug)]
pub struct ResultSink {
    summary: RunSummary,
}

impl ResultSink {
    /// Create the output directory (and parents) if missing.
    pub fn new(output_dir: &Path) -> PipelineResult<Self> {
        fs::create_dir_all(output_dir).map_err(|source| PipelineError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            summary: RunSummary::empty(output_dir.to_path_buf()),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.summary.output_dir
    }

    /// Act on a decision and return the outcome actually recorded.
    ///
    /// A matched image that cannot be copied is recorded as a processing error.
    pub fn record(&mut self, candidate: &Candidate, decision: MatchDecision) -> MatchDecision {
        let decision = match decision {
            MatchDecision::Matched => match copy_with_metadata(candidate.path(), self.output_dir()) {
                Ok(dest) => {
                    tracing::info!(file = %candidate.file_name(), dest = %dest.display(), "Match found");
                    MatchDecision::Matched
                }
                Err(e) => {
                    tracing::warn!(file = %candidate.file_name(), error = %e, "Failed to copy matched image");
                    MatchDecision::ProcessingError {
                        message: e.to_string(),
                    }
                }
            },
            other => other,
        };

        if decision.is_match() {
            self.summary.matched += 1;
        } else if decision.is_skip() {
            self.summary.skipped += 1;
        } else {
            self.summary.errored += 1;
        }
        decision
    }

    /// Counters so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn finish(self) -> RunSummary {
        self.summary
    }
}

/// Copy `source` into `dest_dir` under its own file name, overwriting any
/// existing file and carrying over permissions and timestamps.
pub fn copy_with_metadata(source: &Path, dest_dir: &Path) -> PipelineResult<PathBuf> {
    let copy_err = |to: &Path, source_err: std::io::Error| PipelineError::Copy {
        from: source.to_path_buf(),
        to: to.to_path_buf(),
        source: source_err,
    };

    let file_name = source.file_name().ok_or_else(|| {
        copy_err(
            dest_dir,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name"),
        )
    })?;
    let dest = dest_dir.join(file_name);

    // Copying a file onto itself would truncate it.
    if is_same_file(source, &dest) {
        return Ok(dest);
    }

    let metadata = fs::metadata(source).map_err(|e| copy_err(&dest, e))?;
    fs::copy(source, &dest).map_err(|e| copy_err(&dest, e))?;

    if let Err(e) = preserve_times(&metadata, &dest) {
        tracing::debug!(dest = %dest.display(), error = %e, "Could not preserve timestamps");
    }
    Ok(dest)
}

fn preserve_times(metadata: &fs::Metadata, dest: &Path) -> std::io::Result<()> {
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    File::options().write(true).open(dest)?.set_times(times)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_new_creates_nested_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        let sink = ResultSink::new(&out).unwrap();
        assert!(out.is_dir());
        assert_eq!(sink.output_dir(), out.as_path());
    }

    #[test]
    fn test_record_counts_and_copies() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.jpg");
        fs::write(&src, b"image bytes").unwrap();
        let out = dir.path().join("out");

        let mut sink = ResultSink::new(&out).unwrap();
        let c = Candidate::new(src.clone(), "jpg");
        assert_eq!(sink.record(&c, MatchDecision::Matched), MatchDecision::Matched);
        sink.record(&c, MatchDecision::NoMatch);
        sink.record(&c, MatchDecision::NoFaceDetected);
        sink.record(
            &c,
            MatchDecision::ProcessingError {
                message: "bad".into(),
            },
        );

        let summary = sink.finish();
        assert_eq!((summary.matched, summary.skipped, summary.errored), (1, 2, 1));
        assert_eq!(fs::read(out.join("a.jpg")).unwrap(), b"image bytes");
    }

    #[test]
    fn test_skipped_outcomes_copy_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.jpg");
        fs::write(&src, b"image bytes").unwrap();
        let out = dir.path().join("out");

        let mut sink = ResultSink::new(&out).unwrap();
        let c = Candidate::new(src, "jpg");
        assert_eq!(sink.record(&c, MatchDecision::NoMatch), MatchDecision::NoMatch);
        sink.record(&c, MatchDecision::NoFaceDetected);

        let summary = sink.finish();
        assert_eq!((summary.matched, summary.skipped, summary.errored), (0, 2, 0));
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_failure_counts_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ResultSink::new(dir.path()).unwrap();
        let missing = Candidate::new(dir.path().join("gone").join("x.jpg"), "jpg");

        let recorded = sink.record(&missing, MatchDecision::Matched);
        assert!(matches!(recorded, MatchDecision::ProcessingError { .. }));
        assert_eq!(sink.summary().errored, 1);
        assert_eq!(sink.summary().matched, 0);
    }

    #[test]
    fn test_copy_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.jpg");
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("a.jpg"), b"stale").unwrap();
        fs::write(&src, b"fresh").unwrap();

        copy_with_metadata(&src, &out).unwrap();
        assert_eq!(fs::read(out.join("a.jpg")).unwrap(), b"fresh");
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("old.png");
        fs::write(&src, b"x").unwrap();
        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let dest = copy_with_metadata(&src, &out).unwrap();
        assert_eq!(fs::metadata(dest).unwrap().modified().unwrap(), past);
    }

    #[test]
    fn test_copy_onto_itself_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("self.jpg");
        fs::write(&src, b"keep me").unwrap();

        copy_with_metadata(&src, dir.path()).unwrap();
        assert_eq!(fs::read(&src).unwrap(), b"keep me");
    }
}
