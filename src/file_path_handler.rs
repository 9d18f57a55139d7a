use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::error;

use crate::error::{RunError, TranscodeError};
use crate::executor::TranscodeExecutor;
use crate::ffmpeg::TranscodeTool;
use crate::fstools::{classify_file, resolve_candidates, DirEntryCategory};
use crate::plan::{PlanBuilder, PlanOutcome};
use crate::probe::MediaProbe;
use crate::transcode_state::TranscodeStatus;

/// Counts per outcome for one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchSummary {
    pub transcoded: usize,
    pub skipped: usize,
    pub unsupported: usize,
    pub failed: usize,
}

/// Runs every candidate under a path through planning and execution, one
/// file at a time.
pub struct FilePathHandler<'a, P: MediaProbe, T: TranscodeTool> {
    planner: PlanBuilder<'a, P, T>,
    executor: TranscodeExecutor<'a, P, T>,
    stop: Option<Arc<AtomicBool>>,
}

impl<'a, P: MediaProbe, T: TranscodeTool> FilePathHandler<'a, P, T> {
    pub fn new(planner: PlanBuilder<'a, P, T>, executor: TranscodeExecutor<'a, P, T>) -> Self {
        FilePathHandler {
            planner,
            executor,
            stop: None,
        }
    }

    pub fn stop(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Per-file problems are counted and reported; only fatal ones end the run.
    pub fn handle(&self, path: &Path) -> Result<BatchSummary, RunError> {
        let candidates = resolve_candidates(path)?;
        let batch = candidates.len() > 1 || path.is_dir();
        let mut summary = BatchSummary::default();

        for candidate in candidates {
            if self.should_stop() {
                return Err(TranscodeError::Interrupted { path: candidate }.into());
            }
            if batch {
                println!("processing '{}'..", display_name(&candidate));
            }
            self.handle_file(&candidate, &mut summary)?;
        }

        Ok(summary)
    }

    fn handle_file(&self, path: &Path, summary: &mut BatchSummary) -> Result<(), RunError> {
        if classify_file(path) != DirEntryCategory::RegularFile {
            println!("{}: Not a regular file, thus skipping it.\n", path.display());
            summary.unsupported += 1;
            return Ok(());
        }

        let plan = match self.planner.build(path) {
            Ok(PlanOutcome::Plan(plan)) => plan,
            Ok(PlanOutcome::Unsupported) => {
                println!("This file type is not supported. Thus, skipping '{}'.\n", path.display());
                summary.unsupported += 1;
                return Ok(());
            },
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => {
                error!("{err}");
                println!("{}: Could not determine transcode parameters, thus skipping the file.\n", path.display());
                summary.failed += 1;
                return Ok(());
            },
        };

        match self.executor.execute(path, &plan) {
            TranscodeStatus::Skipped(reason) => {
                println!("{}: {}, thus skipping it.\n", path.display(), reason);
                summary.skipped += 1;
            },
            TranscodeStatus::Done(output) => {
                println!("{} has successfully been transcoded to {}\n", path.display(), output.display());
                summary.transcoded += 1;
            },
            TranscodeStatus::Failed(reason) => {
                error!("{reason}");
                println!("{}: Transcoding failed, the original file was restored.\n", path.display());
                summary.failed += 1;
            },
            TranscodeStatus::Interrupted => {
                println!("{}: Transcoding interrupted, the original file was restored.\n", path.display());
                return Err(TranscodeError::Interrupted { path: PathBuf::from(path) }.into());
            },
            status => {
                error!("{}: executor stopped in non-terminal state {:?}", path.display(), status);
                summary.failed += 1;
            },
        }
        Ok(())
    }

    fn should_stop(&self) -> bool {
        match &self.stop {
            None => false,
            Some(s) => s.load(Ordering::SeqCst),
        }
    }
}

fn display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::containers::Container;
    use crate::error::ProbeError;
    use crate::codecs::Track;
    use crate::executor::ExecutorOptions;
    use crate::plan::tests::{FakeProbe, FakeTool};
    use crate::profile::CompatibilityProfile;

    fn run<P: MediaProbe>(path: &Path, probe: &P, tool: &FakeTool) -> Result<BatchSummary, RunError> {
        let profile = CompatibilityProfile::streaming_stick();
        let planner = PlanBuilder::new(&profile, probe, tool);
        let executor = TranscodeExecutor::new(probe, tool, Container::Matroska, ExecutorOptions::default());
        FilePathHandler::new(planner, executor).handle(path)
    }

    #[test]
    fn test_directory_skips_unsupported() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("clip.avi");
        let notes = dir.path().join("notes.txt");
        fs::write(&clip, b"").unwrap();
        fs::write(&notes, b"").unwrap();
        let probe = FakeProbe::new().with(&clip, "MPEG-4 Visual", "MP3");
        let tool = FakeTool::new();

        let summary = run(dir.path(), &probe, &tool).unwrap();
        assert_eq!(summary, BatchSummary { transcoded: 1, skipped: 0, unsupported: 1, failed: 0 });
        assert!(probe.calls.borrow().iter().all(|(p, _)| *p == clip));
        assert_eq!(tool.jobs.borrow().len(), 1);
        assert!(notes.exists());
    }

    #[test]
    fn test_compatible_file_is_not_renamed() {
        let dir = TempDir::new().unwrap();
        let movie = dir.path().join("movie.mkv");
        fs::write(&movie, b"").unwrap();
        let probe = FakeProbe::new().with(&movie, "AVC", "AAC");
        let tool = FakeTool::new();

        let summary = run(&movie, &probe, &tool).unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(movie.exists());
        assert!(!dir.path().join("movie.mkv.bak").exists());
        assert!(tool.jobs.borrow().is_empty());
    }

    #[test]
    fn test_probe_failure_does_not_abort_batch() {
        let dir = TempDir::new().unwrap();
        let broken = dir.path().join("a_broken.mp4");
        let clip = dir.path().join("b_clip.avi");
        fs::write(&broken, b"not a video").unwrap();
        fs::write(&clip, b"").unwrap();
        let probe = FakeProbe::new().with(&clip, "AVC", "MP3");
        let tool = FakeTool::new();

        let summary = run(dir.path(), &probe, &tool).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.transcoded, 1);
        assert!(broken.exists());
    }

    #[test]
    fn test_failed_transcode_is_counted() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("clip.avi");
        fs::write(&clip, b"").unwrap();
        let probe = FakeProbe::new().with(&clip, "MPEG-4 Visual", "AAC");
        let tool = FakeTool::failing();

        let summary = run(&clip, &probe, &tool).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.transcoded, 0);
        assert!(clip.exists());
    }

    struct MissingProbe;

    impl MediaProbe for MissingProbe {
        fn codec(&self, _path: &Path, _track: Track) -> Result<String, ProbeError> {
            Err(ProbeError::ToolMissing { tool: String::from("mediainfo") })
        }
    }

    #[test]
    fn test_missing_probe_tool_aborts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.avi"), b"").unwrap();
        fs::write(dir.path().join("b.avi"), b"").unwrap();
        let tool = FakeTool::new();

        let result = run(dir.path(), &MissingProbe, &tool);
        assert!(matches!(result, Err(RunError::Plan(_))));
    }

    #[test]
    fn test_stop_flag_aborts_before_next_file() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("clip.avi");
        fs::write(&clip, b"").unwrap();
        let probe = FakeProbe::new().with(&clip, "MPEG-4 Visual", "AAC");
        let tool = FakeTool::new();
        let profile = CompatibilityProfile::streaming_stick();
        let planner = PlanBuilder::new(&profile, &probe, &tool);
        let executor = TranscodeExecutor::new(&probe, &tool, Container::Matroska, ExecutorOptions::default());
        let stop = Arc::new(AtomicBool::new(true));

        let result = FilePathHandler::new(planner, executor).stop(stop).handle(dir.path());
        assert!(matches!(result, Err(RunError::Transcode(TranscodeError::Interrupted { .. }))));
        assert!(tool.jobs.borrow().is_empty());
    }

    #[test]
    fn test_invalid_input() {
        let dir = TempDir::new().unwrap();
        let probe = FakeProbe::new();
        let tool = FakeTool::new();
        assert!(matches!(
            run(&dir.path().join("missing"), &probe, &tool),
            Err(RunError::InvalidInput { .. })));
    }
}
