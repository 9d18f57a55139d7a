use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::containers::Container;
use crate::error::TranscodeError;
use crate::plan::TranscodePlan;

pub mod transcoder;

/// Everything ffmpeg needs to rewrite one file.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscodeJob {
    /// The renamed original.
    pub source: PathBuf,
    pub destination: PathBuf,
    pub plan: TranscodePlan,
    pub container: Container,
    pub total_frames: Option<usize>,
    pub overwrite: bool,
}

/// The external transcoding tool.
pub trait TranscodeTool {
    /// Converts a subtitle file into the format implied by `destination`'s extension.
    fn convert_subtitle(&self, source: &Path, destination: &Path) -> Result<(), TranscodeError>;

    /// Runs `job` to completion; a non-zero exit is an error.
    fn transcode(&self, job: &TranscodeJob) -> Result<(), TranscodeError>;
}

pub struct FFmpeg {
    binary: PathBuf,
    stop: Option<Arc<AtomicBool>>,
}

impl FFmpeg {
    pub fn new(binary: PathBuf) -> Self {
        FFmpeg {
            binary,
            stop: None,
        }
    }

    /// Flag that, once set, kills a running transcode.
    pub fn stop(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn is_installed(&self) -> bool {
        let cmd = Command::new(&self.binary)
            .arg("-codecs")
            .stdin(Stdio::null())
            .output();
        match cmd {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }

    fn should_stop(&self) -> bool {
        match &self.stop {
            None => false,
            Some(s) => s.load(Ordering::SeqCst),
        }
    }

    fn launch_error(&self, path: &Path, source: io::Error) -> TranscodeError {
        match source.kind() {
            io::ErrorKind::NotFound => TranscodeError::ToolMissing { tool: String::from("ffmpeg") },
            _ => TranscodeError::Launch { path: PathBuf::from(path), source },
        }
    }
}

impl TranscodeTool for FFmpeg {
    fn convert_subtitle(&self, source: &Path, destination: &Path) -> Result<(), TranscodeError> {
        let args = subtitle_args(source, destination);
        debug!("{}", transcoder::command_line(&self.binary, &args));
        let status = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| self.launch_error(source, e))?;
        match status.success() {
            true => Ok(()),
            false => match status.code() {
                Some(code) => Err(TranscodeError::for_file(source, &format!("ffmpeg exited with {code}"))),
                None => Err(TranscodeError::for_file(source, "ffmpeg did not exit successfully.")),
            },
        }
    }

    fn transcode(&self, job: &TranscodeJob) -> Result<(), TranscodeError> {
        self.run(job)
    }
}

fn subtitle_args(source: &Path, destination: &Path) -> Vec<PathBuf> {
    vec![
        PathBuf::from("-i"), PathBuf::from(source),
        PathBuf::from(destination),
    ]
}
