pub mod codecs;
pub mod containers;
pub mod error;
pub mod executor;
pub mod ffmpeg;
pub mod file_path_handler;
pub mod fstools;
pub mod plan;
pub mod probe;
pub mod profile;
pub mod tools;
pub mod transcode_state;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use human_repr::HumanDuration;
use rustop::opts;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use error::RunError;
use executor::{ExecutorOptions, TranscodeExecutor};
use ffmpeg::FFmpeg;
use file_path_handler::{BatchSummary, FilePathHandler};
use plan::PlanBuilder;
use probe::MediaInfo;
use profile::CompatibilityProfile;
use tools::ToolPaths;

fn main() -> ExitCode {
    let (args, _rest) = opts! {
        synopsis "Transcode videos into mkv files playable on a chromecast or fire tv stick.";
        opt force:bool=false, desc:"Reprocess files that already have a .bak backup or an .mkv output.";
        opt dry_run:bool=false, desc:"Describe what would be done, but don't actually do anything.";
        opt tool_dir:Option<String>, desc:"Directory searched for ffmpeg and mediainfo before PATH.";
        opt profile:Option<String>, desc:"JSON file overriding the supported codecs and defaults.";
        opt verbose:bool=false, desc:"Print debug diagnostics.";
        param input:String, desc:"Input file/directory";
    }.parse_or_exit();

    init_logging(args.verbose);

    let start = Instant::now();
    let options = ExecutorOptions {
        dry_run: args.dry_run,
        force: args.force,
    };
    let result = run(
        &PathBuf::from(&args.input),
        args.tool_dir.as_deref().map(Path::new),
        args.profile.as_deref().map(Path::new),
        options);

    let code = match result {
        Ok(summary) => {
            println!("## {} transcoded, {} skipped, {} unsupported, {} failed",
                summary.transcoded, summary.skipped, summary.unsupported, summary.failed);
            match summary.failed {
                0 => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            }
        },
        Err(err) => {
            error!("{err}");
            println!("Failure -__-\n{}", err);
            ExitCode::FAILURE
        },
    };
    println!("## Total transcoding duration {}", start.elapsed().as_secs_f64().human_duration());
    code
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("castify_mkv={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(input: &Path, tool_dir: Option<&Path>, profile: Option<&Path>, options: ExecutorOptions) -> Result<BatchSummary, RunError> {
    let profile = match profile {
        Some(path) => CompatibilityProfile::from_file(path)?,
        None => CompatibilityProfile::streaming_stick(),
    };
    let tools = ToolPaths::locate(tool_dir)?;

    let stop = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        if let Err(err) = signal_hook::flag::register(signal, Arc::clone(&stop)) {
            warn!("Unable to install handler for signal {signal}: {err}");
        }
    }

    let ffmpeg = FFmpeg::new(tools.ffmpeg).stop(Arc::clone(&stop));
    if !ffmpeg.is_installed() {
        return Err(RunError::ToolMissing { tool: String::from("ffmpeg") });
    }
    let mediainfo = MediaInfo::new(tools.mediainfo);

    println!("Starting transcoding process..");
    let planner = PlanBuilder::new(&profile, &mediainfo, &ffmpeg).dry_run(options.dry_run);
    let executor = TranscodeExecutor::new(&mediainfo, &ffmpeg, profile.container, options);
    FilePathHandler::new(planner, executor)
        .stop(stop)
        .handle(input)
}
