use std::fs;
use std::path::Path;

use tracing::{error, warn};

use crate::containers::Container;
use crate::error::TranscodeError;
use crate::ffmpeg::{TranscodeJob, TranscodeTool};
use crate::fstools::{backup_path, output_path};
use crate::plan::TranscodePlan;
use crate::probe::MediaProbe;
use crate::transcode_state::{SkipReason, TranscodeState, TranscodeStatus};

#[derive(Clone, Copy, Debug, Default)]
pub struct ExecutorOptions {
    pub dry_run: bool,
    /// Reprocess even when a backup or output from an earlier run exists.
    pub force: bool,
}

/// Applies a plan to one file: skip it, or back it up and transcode.
pub struct TranscodeExecutor<'a, P: MediaProbe, T: TranscodeTool> {
    probe: &'a P,
    tool: &'a T,
    container: Container,
    options: ExecutorOptions,
}

impl<'a, P: MediaProbe, T: TranscodeTool> TranscodeExecutor<'a, P, T> {
    pub fn new(probe: &'a P, tool: &'a T, container: Container, options: ExecutorOptions) -> Self {
        TranscodeExecutor {
            probe,
            tool,
            container,
            options,
        }
    }

    pub fn execute(&self, path: &Path, plan: &TranscodePlan) -> TranscodeStatus {
        let mut state = TranscodeState::new(path.to_path_buf());
        state.advance(TranscodeStatus::PlanEvaluated);

        if plan.is_pass_through() {
            return state.finish(TranscodeStatus::Skipped(SkipReason::AlreadyCompatible));
        }

        let backup = backup_path(path);
        let output = match output_path(path, Container::extension(self.container)) {
            Ok(output) => output,
            Err(err) => return state.finish(TranscodeStatus::Failed(format!("Unable to resolve output path: {err}"))),
        };

        if !self.options.force {
            if backup.exists() {
                return state.finish(TranscodeStatus::Skipped(SkipReason::AlreadyProcessed(backup)));
            }
            if output.exists() {
                return state.finish(TranscodeStatus::Skipped(SkipReason::OutputExists(output)));
            }
        }

        if self.options.dry_run {
            println!("{}: Would transcode ({}) into {:?}.", path.display(), plan, output);
            return state.finish(TranscodeStatus::Skipped(SkipReason::DryRun));
        }

        println!("{}: Transcoding file.", path.display());
        // frame count is read before the rename so the probe sees the original name
        let total_frames = self.probe.frame_count(path);
        if let Err(err) = fs::rename(path, &backup) {
            return state.finish(TranscodeStatus::Failed(format!("Unable to rename {:?} to {:?}: {err}", path, backup)));
        }

        let job = TranscodeJob {
            source: backup.clone(),
            destination: output.clone(),
            plan: plan.clone(),
            container: self.container,
            total_frames,
            overwrite: self.options.force,
        };
        let result = self.tool.transcode(&job);
        state.advance(TranscodeStatus::BackedUpAndTranscoded);

        match result {
            Ok(()) => state.finish(TranscodeStatus::Done(output)),
            Err(err) => {
                restore(path, &job);
                match err {
                    TranscodeError::Interrupted { .. } => state.finish(TranscodeStatus::Interrupted),
                    _ => state.finish(TranscodeStatus::Failed(err.to_string())),
                }
            },
        }
    }
}

/// Drops partial output and moves the backup back to the original name.
fn restore(path: &Path, job: &TranscodeJob) {
    if job.destination.exists() {
        if let Err(err) = fs::remove_file(&job.destination) {
            warn!("Unable to remove partial output {:?}: {err}", job.destination);
        }
    }
    if let Err(err) = fs::rename(&job.source, path) {
        error!("Unable to restore {:?} from {:?}: {err}", path, job.source);
    }
}
