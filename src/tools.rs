use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::RunError;

/// Locations of the external binaries the tool drives.
#[derive(Clone, Debug)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub mediainfo: PathBuf,
}

impl ToolPaths {
    /// Looks up both binaries, trying `tool_dir` (and its `ffmpeg/bin` and
    /// `mediainfo` subdirectories) before `PATH`.
    pub fn locate(tool_dir: Option<&Path>) -> Result<Self, RunError> {
        let search_path = search_path(tool_dir, env::var_os("PATH"));
        Ok(ToolPaths {
            ffmpeg: find("ffmpeg", search_path.as_ref())?,
            mediainfo: find("mediainfo", search_path.as_ref())?,
        })
    }
}

fn search_path(tool_dir: Option<&Path>, path: Option<OsString>) -> Option<OsString> {
    let mut dirs: Vec<PathBuf> = vec![];
    if let Some(dir) = tool_dir {
        dirs.push(PathBuf::from(dir));
        dirs.push(dir.join("ffmpeg").join("bin"));
        dirs.push(dir.join("mediainfo"));
    }
    if let Some(p) = path {
        dirs.extend(env::split_paths(&p));
    }
    env::join_paths(dirs).ok()
}

fn find(name: &str, search_path: Option<&OsString>) -> Result<PathBuf, RunError> {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match which::which_in(name, search_path, cwd) {
        Ok(path) => {
            debug!("using {} at {:?}", name, path);
            Ok(path)
        },
        Err(_) => Err(RunError::ToolMissing { tool: String::from(name) }),
    }
}
