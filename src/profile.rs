use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::containers::{Container, SUPPORTED_EXTENSIONS};
use crate::error::ProfileError;
use crate::probe::TRACK_SEPARATOR;

/// What the target device plays without help, and what to convert to otherwise.
///
/// Codec names are compared against probe output ignoring ASCII case, the same
/// way for video and audio.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompatibilityProfile {
    pub video_codecs: Vec<String>,
    pub audio_codecs: Vec<String>,
    pub default_video_codec: String,
    pub default_audio_codec: String,
    pub extensions: Vec<String>,
    #[serde(skip)]
    pub container: Container,
}

impl Default for CompatibilityProfile {
    fn default() -> Self {
        CompatibilityProfile::streaming_stick()
    }
}

impl CompatibilityProfile {
    /// Chromecast / Fire TV stick class devices.
    pub fn streaming_stick() -> Self {
        CompatibilityProfile {
            video_codecs: vec![String::from("AVC")],
            audio_codecs: vec![
                String::from("AAC"),
                String::from("MPEG Audio"),
                String::from("Vorbis"),
                String::from("Ogg"),
            ],
            default_video_codec: String::from("h264"),
            default_audio_codec: String::from("libvorbis"),
            extensions: SUPPORTED_EXTENSIONS.iter().map(|e| String::from(*e)).collect(),
            container: Container::Matroska,
        }
    }

    /// Reads a JSON profile; fields left out keep their streaming-stick values.
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let json = fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: PathBuf::from(path),
            source,
        })?;
        let profile = serde_json::from_str::<CompatibilityProfile>(&json).map_err(|source| ProfileError::Parse {
            path: PathBuf::from(path),
            source,
        })?;
        profile.validate(path)?;
        Ok(profile)
    }

    fn validate(&self, path: &Path) -> Result<(), ProfileError> {
        let invalid = |msg: &str| ProfileError::Invalid { path: PathBuf::from(path), msg: String::from(msg) };
        if self.default_video_codec.trim().is_empty() {
            return Err(invalid("default_video_codec is empty"));
        }
        if self.default_audio_codec.trim().is_empty() {
            return Err(invalid("default_audio_codec is empty"));
        }
        if self.extensions.is_empty() {
            return Err(invalid("extensions is empty"));
        }
        Ok(())
    }

    pub fn accepts_video(&self, codec: &str) -> bool {
        contains_ignore_case(&self.video_codecs, codec)
    }

    pub fn accepts_audio(&self, codec: &str) -> bool {
        contains_ignore_case(&self.audio_codecs, codec)
    }
}

/// Every track named in `codec` must be on the list.
fn contains_ignore_case(names: &[String], codec: &str) -> bool {
    codec.split(TRACK_SEPARATOR)
        .all(|track| names.iter().any(|name| name.eq_ignore_ascii_case(track.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_whitelists_ignore_case() {
        let profile = CompatibilityProfile::streaming_stick();
        assert!(profile.accepts_video("AVC"));
        assert!(profile.accepts_video("avc"));
        assert!(!profile.accepts_video("MPEG-4 Visual"));
        assert!(!profile.accepts_video("HEVC"));
        assert!(profile.accepts_audio("AAC"));
        assert!(profile.accepts_audio("mpeg audio"));
        assert!(profile.accepts_audio("Vorbis"));
        assert!(!profile.accepts_audio("MP3"));
        assert!(!profile.accepts_audio("AC-3"));
        assert!(!profile.accepts_audio("AACMPEG Audio"));
    }

    #[test]
    fn test_every_track_must_be_accepted() {
        let profile = CompatibilityProfile::streaming_stick();
        assert!(profile.accepts_audio("AAC / Vorbis"));
        assert!(profile.accepts_audio("Vorbis / Vorbis"));
        assert!(!profile.accepts_audio("AAC / AC-3"));
        assert!(!profile.accepts_audio("VorbisVorbis"));
        assert!(profile.accepts_video("AVC / avc"));
        assert!(!profile.accepts_video("AVC / HEVC"));
    }

    #[test]
    fn test_from_file_partial_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{ "video_codecs": ["AVC", "HEVC"], "default_audio_codec": "aac" }"#).unwrap();

        let profile = CompatibilityProfile::from_file(&path).unwrap();
        assert!(profile.accepts_video("hevc"));
        assert_eq!(profile.default_audio_codec, "aac");
        assert_eq!(profile.default_video_codec, "h264");
        assert_eq!(profile.extensions.len(), SUPPORTED_EXTENSIONS.len());
        assert_eq!(profile.container, Container::Matroska);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            CompatibilityProfile::from_file(&dir.path().join("missing.json")),
            Err(ProfileError::Read { .. })));

        let garbled = dir.path().join("garbled.json");
        fs::write(&garbled, "{ video_codecs").unwrap();
        assert!(matches!(CompatibilityProfile::from_file(&garbled), Err(ProfileError::Parse { .. })));

        let empty = dir.path().join("empty.json");
        fs::write(&empty, r#"{ "default_video_codec": "" }"#).unwrap();
        assert!(matches!(CompatibilityProfile::from_file(&empty), Err(ProfileError::Invalid { .. })));
    }
}
