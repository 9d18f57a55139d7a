use std::fmt::Display;

/// Track selector passed to the probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Track {
    Video,
    Audio,
}

impl Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Track::Video => write!(f, "Video"),
            Track::Audio => write!(f, "Audio"),
        }
    }
}

/// What happens to a video or audio stream.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamAction {
    Copy,
    Encode(String),
}

impl StreamAction {
    pub fn is_copy(&self) -> bool {
        matches!(self, StreamAction::Copy)
    }

    /// Encoder name as handed to ffmpeg.
    pub fn encoder(&self) -> &str {
        match self {
            StreamAction::Copy => "copy",
            StreamAction::Encode(codec) => codec,
        }
    }
}

impl Display for StreamAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encoder())
    }
}
