use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codecs::{StreamAction, Track};
use crate::containers::is_supported_file;
use crate::error::{PlanError, ProbeError};
use crate::ffmpeg::TranscodeTool;
use crate::fstools::sidecar_path;
use crate::probe::MediaProbe;
use crate::profile::CompatibilityProfile;

#[derive(Clone, Debug, PartialEq)]
pub enum SubtitleAction {
    Copy,
    /// Add the external `.srt` at this path as a soft subtitle track.
    Inject(PathBuf),
}

impl SubtitleAction {
    pub fn is_copy(&self) -> bool {
        matches!(self, SubtitleAction::Copy)
    }
}

impl Display for SubtitleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubtitleAction::Copy => write!(f, "copy"),
            SubtitleAction::Inject(path) => write!(f, "inject {}", path.display()),
        }
    }
}

/// A file as seen while planning.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub video_codec: String,
    pub audio_codec: String,
    pub subtitle: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TranscodePlan {
    pub subtitle: SubtitleAction,
    pub video: StreamAction,
    pub audio: StreamAction,
}

impl TranscodePlan {
    /// Each track is decided on its own.
    pub fn for_media(media: &MediaFile, profile: &CompatibilityProfile) -> Self {
        TranscodePlan {
            subtitle: match &media.subtitle {
                Some(srt) => SubtitleAction::Inject(srt.clone()),
                None => SubtitleAction::Copy,
            },
            video: if profile.accepts_video(&media.video_codec) {
                StreamAction::Copy
            } else {
                StreamAction::Encode(profile.default_video_codec.clone())
            },
            // no audio track, nothing to convert
            audio: if media.audio_codec.is_empty() || profile.accepts_audio(&media.audio_codec) {
                StreamAction::Copy
            } else {
                StreamAction::Encode(profile.default_audio_codec.clone())
            },
        }
    }

    pub fn is_pass_through(&self) -> bool {
        self.subtitle.is_copy() && self.video.is_copy() && self.audio.is_copy()
    }
}

impl Display for TranscodePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subtitles: {}, video: {}, audio: {}", self.subtitle, self.video, self.audio)
    }
}

#[derive(Debug, PartialEq)]
pub enum PlanOutcome {
    Plan(TranscodePlan),
    Unsupported,
}

pub struct PlanBuilder<'a, P: MediaProbe, T: TranscodeTool> {
    profile: &'a CompatibilityProfile,
    probe: &'a P,
    tool: &'a T,
    dry_run: bool,
}

impl<'a, P: MediaProbe, T: TranscodeTool> PlanBuilder<'a, P, T> {
    pub fn new(profile: &'a CompatibilityProfile, probe: &'a P, tool: &'a T) -> Self {
        PlanBuilder {
            profile,
            probe,
            tool,
            dry_run: false,
        }
    }

    /// In a dry run `.ass` sidecars are not converted or deleted.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(&self, path: &Path) -> Result<PlanOutcome, PlanError> {
        if !is_supported_file(path, self.profile.extensions.as_slice()) {
            return Ok(PlanOutcome::Unsupported);
        }

        let media = MediaFile {
            path: PathBuf::from(path),
            subtitle: self.subtitle_sidecar(path)?,
            video_codec: self.video_codec(path)?,
            audio_codec: self.audio_codec(path)?,
        };
        let plan = TranscodePlan::for_media(&media, self.profile);
        report(&media, &plan);
        Ok(PlanOutcome::Plan(plan))
    }

    /// The `.srt` to inject, converting a lone `.ass` sidecar first.
    fn subtitle_sidecar(&self, path: &Path) -> Result<Option<PathBuf>, PlanError> {
        let srt = sidecar_path(path, "srt");
        if srt.is_file() {
            println!("Found subtitles {:?}.", srt);
            return Ok(Some(srt));
        }

        let ass = sidecar_path(path, "ass");
        if !ass.is_file() {
            return Ok(None);
        }

        if self.dry_run {
            println!("Would convert {:?} to {:?}.", ass, srt);
            return Ok(Some(srt));
        }

        println!("Converting {:?} to {:?}.", ass, srt);
        self.tool.convert_subtitle(&ass, &srt)?;
        fs::remove_file(&ass).map_err(|source| PlanError::RemoveSidecar { path: ass.clone(), source })?;
        debug!("removed {:?}", ass);
        Ok(Some(srt))
    }

    fn video_codec(&self, path: &Path) -> Result<String, PlanError> {
        let codec = self.probe.codec(path, Track::Video)?;
        if codec.is_empty() {
            return Err(ProbeError::NoVideoTrack { path: PathBuf::from(path) }.into());
        }
        Ok(codec)
    }

    fn audio_codec(&self, path: &Path) -> Result<String, PlanError> {
        Ok(self.probe.codec(path, Track::Audio)?)
    }
}

fn report(media: &MediaFile, plan: &TranscodePlan) {
    debug!("{:?}: {}", media.path, plan);
    println!("Video codec: {}", media.video_codec);
    match &plan.video {
        StreamAction::Copy => println!("Video codec is compatible, setting video param to 'copy'."),
        StreamAction::Encode(codec) => println!("Video codec is not compatible, setting transcode parameter to {codec}."),
    }
    println!("Audio codec: {}", media.audio_codec);
    match &plan.audio {
        StreamAction::Copy => println!("Audio codec is compatible, setting audio param to 'copy'."),
        StreamAction::Encode(codec) => println!("Audio codec is not compatible, setting transcode parameter to {codec}."),
    }
}
