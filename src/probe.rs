use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::codecs::Track;
use crate::error::ProbeError;

/// Joins the formats of a file with several tracks of one kind.
pub const TRACK_SEPARATOR: &str = " / ";

/// Source of per-track codec names.
pub trait MediaProbe {
    /// Format name of `track` in `path`, trailing whitespace removed.
    /// Files with several tracks of the kind report them joined by `TRACK_SEPARATOR`.
    fn codec(&self, path: &Path, track: Track) -> Result<String, ProbeError>;

    /// Number of video frames, when the probe can tell.
    fn frame_count(&self, _path: &Path) -> Option<usize> {
        None
    }
}

/// Probes files with the `mediainfo` CLI, one invocation per query.
pub struct MediaInfo {
    binary: PathBuf,
}

impl MediaInfo {
    pub fn new(binary: PathBuf) -> Self {
        MediaInfo { binary }
    }

    fn inform(&self, path: &Path, template: &str) -> Result<String, ProbeError> {
        let args = inform_args(path, template);
        debug!("mediainfo {:?}", args);
        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => ProbeError::ToolMissing { tool: String::from("mediainfo") },
                _ => ProbeError::Launch { path: PathBuf::from(path), source },
            })?;
        if output.status.success() {
            match String::from_utf8(output.stdout) {
                Ok(utf8) => Ok(String::from(utf8.trim_end())),
                Err(_) => Err(ProbeError::for_file(path, "mediainfo output is not valid UTF-8.")),
            }
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            match output.status.code() {
                Some(code) => Err(ProbeError::for_file(path, &format!("mediainfo exited with {code}: {}", stderr.trim_end()))),
                None => Err(ProbeError::for_file(path, "mediainfo did not exit successfully.")),
            }
        }
    }
}

impl MediaProbe for MediaInfo {
    fn codec(&self, path: &Path, track: Track) -> Result<String, ProbeError> {
        let formats = self.inform(path, &format!("{track};%Format%|"))?;
        Ok(join_tracks(&formats))
    }

    fn frame_count(&self, path: &Path) -> Option<usize> {
        match self.inform(path, "Video;%FrameCount%|") {
            Ok(counts) => counts.split('|').next()?.trim().parse().ok(),
            Err(_) => None,
        }
    }
}

/// mediainfo repeats the template once per track; `|` ends each repetition.
fn join_tracks(formats: &str) -> String {
    formats.split('|')
        .map(str::trim)
        .filter(|format| !format.is_empty())
        .collect::<Vec<_>>()
        .join(TRACK_SEPARATOR)
}

fn inform_args(path: &Path, template: &str) -> Vec<PathBuf> {
    vec![
        PathBuf::from(format!("--Inform={template}")),
        PathBuf::from(path),
    ]
}
