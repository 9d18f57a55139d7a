use std::fmt::Display;
use std::path::PathBuf;

use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    AlreadyCompatible,
    /// `<name>.bak` exists from an earlier run.
    AlreadyProcessed(PathBuf),
    OutputExists(PathBuf),
    DryRun,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyCompatible => write!(f, "File is already playable on a chromecast or fire tv stick"),
            SkipReason::AlreadyProcessed(backup) => write!(f, "Backup {:?} already exists, file was processed before", backup),
            SkipReason::OutputExists(output) => write!(f, "Output {:?} already exists", output),
            SkipReason::DryRun => write!(f, "Dry run"),
        }
    }
}

/// Life cycle of one file inside the executor.
#[derive(Clone, Debug, PartialEq)]
pub enum TranscodeStatus {
    Idle,
    PlanEvaluated,
    Skipped(SkipReason),
    BackedUpAndTranscoded,
    Done(PathBuf),
    Failed(String),
    /// Stopped by a signal; the original was put back.
    Interrupted,
}

impl TranscodeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self,
            TranscodeStatus::Skipped(_)
            | TranscodeStatus::Done(_)
            | TranscodeStatus::Failed(_)
            | TranscodeStatus::Interrupted)
    }
}

#[derive(Clone, Debug)]
pub struct TranscodeState {
    pub path: PathBuf,
    pub status: TranscodeStatus,
}

impl TranscodeState {
    pub fn new(path: PathBuf) -> Self {
        TranscodeState {
            path,
            status: TranscodeStatus::Idle,
        }
    }

    pub fn advance(&mut self, next: TranscodeStatus) {
        debug!("{:?}: {:?} -> {:?}", self.path, self.status, next);
        self.status = next;
    }

    pub fn finish(mut self, next: TranscodeStatus) -> TranscodeStatus {
        debug_assert!(next.is_terminal());
        self.advance(next);
        self.status
    }
}
