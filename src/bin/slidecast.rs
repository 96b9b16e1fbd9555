use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use slidecast::{
    AudioTrack, CancelToken, FfmpegTransform, Pipeline, PipelineConfig, RunRequest,
    SlidecastError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "slidecast", version, about = "Build a captioned slideshow MP4")]
struct Cli {
    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the slideshow (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Print the format and duration of an audio file.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Working directory with the source images; the video is written here.
    #[arg(long)]
    dir: PathBuf,

    /// Captions: one per non-empty line, or a JSON array of strings for `.json` files.
    #[arg(long)]
    captions: PathBuf,

    /// Background audio. Trimmed in place and removed after a successful run.
    #[arg(long)]
    audio: PathBuf,

    /// Label for the audio track in the summary.
    #[arg(long, default_value = "music")]
    track_type: String,

    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Seconds each image stays on screen.
    #[arg(long)]
    duration: Option<f64>,

    /// Output filename suffix.
    #[arg(long)]
    output_pattern: Option<String>,

    /// Compositing worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Audio file to inspect.
    path: PathBuf,

    /// Print as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Probe(args) => cmd_probe(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let post_success = err
                .downcast_ref::<SlidecastError>()
                .is_some_and(SlidecastError::is_post_success);
            eprintln!("error: {err:#}");
            if post_success {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(w) = args.width {
        config.video_width = w;
    }
    if let Some(h) = args.height {
        config.video_height = h;
    }
    if let Some(d) = args.duration {
        config.display_duration_per_image = d;
    }
    if let Some(p) = args.output_pattern {
        config.output_filename_pattern = p;
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }

    let captions = read_captions(&args.captions)?;
    let pipeline = Pipeline::new(config, Arc::new(FfmpegTransform::new()))?;
    let request = RunRequest {
        working_dir: args.dir,
        captions,
        audio: AudioTrack {
            path: args.audio,
            track_type: args.track_type,
        },
    };

    match pipeline.run(&request) {
        Ok(summary) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{summary}");
            }
            Ok(())
        }
        Err(SlidecastError::Cleanup { summary, failures }) => {
            // The video exists; print its summary before reporting the leftovers.
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{summary}");
            }
            Err(SlidecastError::Cleanup { summary, failures }.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let asset = slidecast::probe(&args.path, &FfmpegTransform::new(), &CancelToken::new())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&asset)?);
    } else {
        println!(
            "{}: {} {:.3}s",
            asset.path.display(),
            asset.format,
            asset.duration_sec
        );
    }
    Ok(())
}

fn read_captions(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read captions '{}'", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        return serde_json::from_str(&text)
            .with_context(|| format!("parse captions JSON '{}'", path.display()));
    }
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect())
}
