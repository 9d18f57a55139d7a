use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::RunError;

#[derive(Debug, PartialEq)]
pub enum DirEntryCategory {
    DoesNotExist,
    RegularFile,
    Directory,
    Unknown,
}

pub fn classify_file(path: &Path) -> DirEntryCategory {
    match fs::metadata(path) {
        Ok(metadata) => {
            if metadata.is_file() {
                DirEntryCategory::RegularFile
            } else if metadata.is_dir() {
                DirEntryCategory::Directory
            } else {
                DirEntryCategory::Unknown
            }
        },
        Err(_) => DirEntryCategory::DoesNotExist,
    }
}

/// Ordered candidate paths for `path`: the file itself, or every direct
/// child of a directory sorted by name. Children are not filtered here.
pub fn resolve_candidates(path: &Path) -> Result<Vec<PathBuf>, RunError> {
    match classify_file(path) {
        DirEntryCategory::RegularFile => Ok(vec![PathBuf::from(path)]),
        DirEntryCategory::Directory => {
            let entries = fs::read_dir(path).map_err(|source| RunError::ReadDir {
                path: PathBuf::from(path),
                source,
            })?;
            let mut children: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .collect();
            children.sort();
            Ok(children)
        },
        DirEntryCategory::DoesNotExist | DirEntryCategory::Unknown => {
            Err(RunError::InvalidInput { path: PathBuf::from(path) })
        },
    }
}

/// `path` with `suffix` appended to the full file name, e.g. `clip.avi` -> `clip.avi.bak`.
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

pub fn backup_path(path: &Path) -> PathBuf {
    append_suffix(path, ".bak")
}

/// Output lands next to the original, named after its absolute path plus the
/// container extension, so `clip.avi` becomes `/abs/dir/clip.avi.mkv`.
pub fn output_path(path: &Path, extension: &str) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    Ok(append_suffix(&absolute, &format!(".{extension}")))
}

/// Sidecar sharing the base name of `path`, e.g. `show.wmv` -> `show.srt`.
pub fn sidecar_path(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}
