use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures of the external media-probing tool.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Could not find {tool} on path. Install {tool} or set the path and try again.")]
    ToolMissing { tool: String },

    #[error("Error launching probe for {path:?}: {source}")]
    Launch { path: PathBuf, source: io::Error },

    #[error("Error probing {path:?}: {msg}")]
    Failed { path: PathBuf, msg: String },

    #[error("{path:?} has no video track.")]
    NoVideoTrack { path: PathBuf },
}

impl ProbeError {
    pub fn for_file(path: &Path, msg: &str) -> Self {
        ProbeError::Failed {
            path: PathBuf::from(path),
            msg: String::from(msg),
        }
    }

    /// Launch problems concern the binary, not the file, so they end the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProbeError::ToolMissing { .. } | ProbeError::Launch { .. })
    }
}

/// Failures of the external transcoding tool.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Could not find {tool} on path. Install {tool} or set the path and try again.")]
    ToolMissing { tool: String },

    #[error("Error launching ffmpeg for {path:?}: {source}")]
    Launch { path: PathBuf, source: io::Error },

    #[error("Error transcoding {path:?}: {msg}")]
    Failed { path: PathBuf, msg: String },

    #[error("Transcoding {path:?} was interrupted.")]
    Interrupted { path: PathBuf },
}

impl TranscodeError {
    pub fn for_file(path: &Path, msg: &str) -> Self {
        TranscodeError::Failed {
            path: PathBuf::from(path),
            msg: String::from(msg),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self,
            TranscodeError::ToolMissing { .. }
            | TranscodeError::Launch { .. }
            | TranscodeError::Interrupted { .. })
    }
}

/// Failures while deciding what to do with a single file.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Error converting subtitles: {0}")]
    Subtitle(#[from] TranscodeError),

    #[error("Error removing {path:?}: {source}")]
    RemoveSidecar { path: PathBuf, source: io::Error },
}

impl PlanError {
    pub fn is_fatal(&self) -> bool {
        match self {
            PlanError::Probe(err) => err.is_fatal(),
            PlanError::Subtitle(err) => err.is_fatal(),
            PlanError::RemoveSidecar { .. } => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Error reading profile {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Error parsing profile {path:?}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("Invalid profile {path:?}: {msg}")]
    Invalid { path: PathBuf, msg: String },
}

/// Conditions that abort the whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{path:?} is neither a file nor a directory or does not exist.")]
    InvalidInput { path: PathBuf },

    #[error("Error reading directory {path:?}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("Could not find {tool} on path. Install {tool} or set the path and try again.")]
    ToolMissing { tool: String },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}
