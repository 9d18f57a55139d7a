use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use human_repr::HumanCount;
use kdam::{term, tqdm, BarExt};
use tracing::{debug, warn};

use crate::containers::Container;
use crate::error::TranscodeError;
use crate::plan::SubtitleAction;
use super::{FFmpeg, TranscodeJob};

#[derive(Debug)]
struct TranscodeProgress {
    pub frame: usize,
    pub fps: f64,
    pub total_size: usize,
}

impl TranscodeProgress {
    pub fn new() -> Self {
        TranscodeProgress {
            frame: 0,
            fps: 0.0,
            total_size: 0,
        }
    }
}

#[derive(Debug, PartialEq)]
enum FFmpegStdoutResult {
    Continue,
    Render,
}

impl FFmpeg {
    pub(super) fn run(&self, job: &TranscodeJob) -> Result<(), TranscodeError> {
        let args = build_args(job);
        println!("executing {}", command_line(&self.binary, &args));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| self.launch_error(&job.source, e))?;

        if let Some(stdout) = child.stdout.take() {
            self.consume_stdout(stdout, job.total_frames, &mut child);
        }

        let status = child.wait().map_err(|_| {
            TranscodeError::for_file(&job.source, "There was an error waiting for the ffmpeg process.")
        })?;

        if self.should_stop() {
            return Err(TranscodeError::Interrupted { path: job.source.clone() });
        }

        match status.success() {
            true => Ok(()),
            false => match status.code() {
                Some(code) => Err(TranscodeError::for_file(&job.source, &format!("ffmpeg exited with {code}"))),
                None => Err(TranscodeError::for_file(&job.source, "ffmpeg did not exit successfully.")),
            },
        }
    }

    fn consume_stdout(&self, stdout: ChildStdout, total_frames: Option<usize>, child: &mut Child) {
        term::init(false);

        let mut pbar = tqdm!(
            total = total_frames.unwrap_or(0),
            desc = "transcoding",
            position = 0,
            force_refresh = true
        );
        let mut progress = TranscodeProgress::new();
        let stdout_reader = BufReader::new(stdout);
        for line in stdout_reader.lines() {
            if let Ok(l) = line {
                if handle_ffmpeg_stdout_line(&l, &mut progress) == FFmpegStdoutResult::Render {
                    let postfix = match total_frames {
                        Some(total) => format!("{} ({})",
                            progress.total_size.human_count_bytes(),
                            predict_size(progress.total_size, total, progress.frame).human_count_bytes()),
                        None => format!("{}", progress.total_size.human_count_bytes()),
                    };
                    pbar.set_postfix(format!("{postfix} @ {:.1} fps", progress.fps));
                    let _ = pbar.update_to(progress.frame);
                }
            }

            if self.should_stop() {
                println!();
                println!("Caught stop signal; killing ffmpeg!");
                if let Err(err) = child.kill() {
                    warn!("error killing ffmpeg process ({}) {err:?}", child.id());
                }
                return;
            }
        }

        println!();
    }
}

/// Argument list for `job`, handed to ffmpeg without a shell.
pub fn build_args(job: &TranscodeJob) -> Vec<PathBuf> {
    fn pbs(s: &str) -> PathBuf { PathBuf::from(s) }

    let mut args = vec![
        pbs("-hide_banner"),
        pbs("-nostats"),
        pbs("-loglevel"), pbs("error"),
        pbs("-progress"), pbs("pipe:1"),
        pbs(if job.overwrite { "-y" } else { "-n" }),
        pbs("-i"), job.source.clone(),
    ];

    if let SubtitleAction::Inject(srt) = &job.plan.subtitle {
        args.push(pbs("-i")); args.push(srt.clone());
    }

    // map every stream of the original
    args.push(pbs("-map")); args.push(pbs("0"));
    if let SubtitleAction::Inject(_) = &job.plan.subtitle {
        args.push(pbs("-map")); args.push(pbs("1"));
    }

    // the sidecar is subrip already, so subtitles are always copied
    args.push(pbs("-scodec")); args.push(pbs("copy"));
    args.push(pbs("-vcodec")); args.push(pbs(job.plan.video.encoder()));
    args.push(pbs("-acodec")); args.push(pbs(job.plan.audio.encoder()));

    // explicity set container format, regardless of destination extension
    let mut container_args: Vec<PathBuf> = Container::parameters(job.container)
        .iter().map(|s| pbs(s)).collect();
    args.append(&mut container_args);

    args.push(job.destination.clone());
    args
}

/// Printable form of an invocation, for logs only.
pub fn command_line(binary: &Path, args: &[PathBuf]) -> String {
    let mut line = binary.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&format!("{:?}", arg));
    }
    line
}

fn handle_ffmpeg_stdout_line(line: &str, progress: &mut TranscodeProgress) -> FFmpegStdoutResult {
    let parts: Vec<&str> = line.split('=').collect();
    if parts.len() == 2 {
        match parts[0] {
            "fps" => {
                progress.fps = parts[1].parse().unwrap_or(progress.fps);
                FFmpegStdoutResult::Continue
            },
            "frame" => {
                progress.frame = parts[1].parse().unwrap_or(progress.frame);
                FFmpegStdoutResult::Continue
            },
            "total_size" => {
                progress.total_size = parts[1].parse().unwrap_or(progress.total_size);
                FFmpegStdoutResult::Continue
            },
            "progress" => FFmpegStdoutResult::Render,
            _ => FFmpegStdoutResult::Continue,
        }
    } else {
        debug!("ignoring ffmpeg progress line {:?}", line);
        FFmpegStdoutResult::Continue
    }
}

fn predict_size(current_size: usize, total_frames: usize, frames_done: usize) -> usize {
    match frames_done {
        0 => 0,
        _ => ((current_size as f64) * ((total_frames as f64) / (frames_done as f64))) as usize
    }
}
