use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;

use crate::assemble::sequence::assemble;
use crate::audio::conform::{ConformOutcome, conform};
use crate::caption::compose::{ComposeSettings, compose_all};
use crate::caption::props::CaptionProperties;
use crate::foundation::core::Canvas;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::media::process::CancelToken;
use crate::media::transform::MediaTransform;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::input::{CaptionedFrame, Truncation, discover_images, pair_frames};
use crate::pipeline::timing::TimingPlan;

/// Timestamp prefix of output files.
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Pipeline stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Checking the working directory and pairing images with captions.
    Validating,
    /// Fixing frame count and video length.
    ComputingTiming,
    /// Probing and trimming the audio track.
    ConformingAudio,
    /// Producing captioned frames.
    Compositing,
    /// Encoding frames and audio into the output video.
    Assembling,
    /// Removing intermediate artifacts.
    CleaningUp,
    /// Finished.
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::ComputingTiming => "computing-timing",
            Self::ConformingAudio => "conforming-audio",
            Self::Compositing => "compositing",
            Self::Assembling => "assembling",
            Self::CleaningUp => "cleaning-up",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// The background track for a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioTrack {
    /// Audio file. Trimmed in place, then removed once the video is written.
    pub path: PathBuf,
    /// Free-form label reported in the summary (e.g. `music`, `narration`).
    pub track_type: String,
}

/// Inputs of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunRequest {
    /// Directory holding the source images; also receives the output video.
    pub working_dir: PathBuf,
    /// Captions, index-aligned with the sorted images.
    pub captions: Vec<String>,
    /// Background track.
    pub audio: AudioTrack,
}

/// An intermediate artifact that could not be removed.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CleanupFailure {
    /// Artifact path.
    pub path: PathBuf,
    /// Why removal failed.
    pub message: String,
}

/// Report of a finished run.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RunSummary {
    /// Directory the run worked in.
    pub working_dir: PathBuf,
    /// Frames in assembly order.
    pub frames: Vec<CaptionedFrame>,
    /// Seconds each image is on screen.
    pub seconds_per_image: f64,
    /// Video length in seconds.
    pub total_sec: f64,
    /// Output canvas.
    pub canvas: Canvas,
    /// Caption styling used.
    pub caption: CaptionProperties,
    /// Label of the background track.
    pub audio_track_type: String,
    /// Background track path.
    pub audio_path: PathBuf,
    /// What conforming did to the track.
    pub audio: ConformOutcome,
    /// Set when captions and images had different counts.
    pub truncation: Option<Truncation>,
    /// Written video.
    pub output_path: PathBuf,
    /// Wall time of the run in seconds.
    pub elapsed_sec: f64,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===SUMMARY===")?;
        writeln!(f, "Working directory: {}", self.working_dir.display())?;
        writeln!(f, "Images: {}", self.frames.len())?;
        for frame in &self.frames {
            writeln!(
                f,
                "  [{:04}] {} | {}",
                frame.ordinal,
                frame.image.display(),
                frame.caption
            )?;
        }
        if let Some(t) = &self.truncation {
            writeln!(
                f,
                "Truncated: {} images / {} captions, kept {}",
                t.images, t.captions, t.kept
            )?;
        }
        writeln!(f, "Duration per image: {:.3}s", self.seconds_per_image)?;
        writeln!(f, "Video length: {:.3}s", self.total_sec)?;
        writeln!(f, "Dimensions: {}", self.canvas)?;
        writeln!(
            f,
            "Caption: font {} {}, offset {}, box {} border {}, line spacing {}",
            self.caption.font_size,
            self.caption.font_color,
            self.caption.caption_offset_y,
            self.caption.box_color,
            self.caption.box_borderw,
            self.caption.line_spacing
        )?;
        writeln!(
            f,
            "Audio ({}): {}",
            self.audio_track_type,
            self.audio_path.display()
        )?;
        match self.audio {
            ConformOutcome::Unchanged { duration_sec } => {
                writeln!(f, "  {duration_sec:.3}s, unchanged")?
            }
            ConformOutcome::Trimmed { from_sec, to_sec } => {
                writeln!(f, "  trimmed {from_sec:.3}s -> {to_sec:.3}s")?
            }
        }
        writeln!(f, "Output: {}", self.output_path.display())?;
        write!(f, "Elapsed: {:.2}s", self.elapsed_sec)
    }
}

/// First free `<dir>/<YYYYMMDD_HHMMSS>_<pattern>.mp4`.
///
/// When a file of that name already exists (two runs within the same second), `_2`, `_3`, ... is
/// appended so an earlier video is never overwritten or removed by this run.
pub fn output_path_for(dir: &Path, pattern: &str, at: &chrono::NaiveDateTime) -> PathBuf {
    let stem = format!("{}_{pattern}", at.format(OUTPUT_TIMESTAMP_FORMAT));
    let base = dir.join(format!("{stem}.mp4"));
    if !base.exists() {
        return base;
    }
    (2u32..)
        .map(|n| dir.join(format!("{stem}_{n}.mp4")))
        .find(|p| !p.exists())
        .unwrap_or(base)
}

/// Runs the slideshow pipeline against a [`MediaTransform`].
pub struct Pipeline {
    config: PipelineConfig,
    transform: Arc<dyn MediaTransform>,
    cancel: CancelToken,
}

/// Artifacts created so far, removed again if the run fails.
#[derive(Default)]
struct Created {
    frames_dir: Option<PathBuf>,
    output: Option<PathBuf>,
}

impl Pipeline {
    /// Validate `config` and build a pipeline.
    pub fn new(config: PipelineConfig, transform: Arc<dyn MediaTransform>) -> SlidecastResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transform,
            cancel: CancelToken::new(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Token that cancels runs of this pipeline, killing any running media tool.
    ///
    /// Cancellation is permanent: later runs fail with [`SlidecastError::Cancelled`].
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run every stage for `req`.
    ///
    /// On failure before cleanup, the frames directory and any partial output video are removed
    /// and the stage error is returned. Failure to remove intermediates after the video is written
    /// is reported as [`SlidecastError::Cleanup`], which carries the summary.
    #[tracing::instrument(skip_all, fields(dir = %req.working_dir.display()))]
    pub fn run(&self, req: &RunRequest) -> SlidecastResult<RunSummary> {
        let started = Instant::now();
        let mut stage = Stage::Validating;
        let mut created = Created::default();

        let mut summary = match self.produce(req, &mut stage, &mut created) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(%stage, error = %e, "pipeline failed");
                discard(&created);
                return Err(e);
            }
        };

        enter(&mut stage, Stage::CleaningUp);
        let mut failures = Vec::new();
        if let Some(dir) = &created.frames_dir {
            remove_artifact(dir, true, &mut failures);
        }
        remove_artifact(&req.audio.path, false, &mut failures);
        summary.elapsed_sec = started.elapsed().as_secs_f64();

        if !failures.is_empty() {
            for failure in &failures {
                tracing::error!(
                    path = %failure.path.display(),
                    error = %failure.message,
                    "cleanup failed; remove manually"
                );
            }
            return Err(SlidecastError::Cleanup {
                summary: Box::new(summary),
                failures,
            });
        }

        enter(&mut stage, Stage::Done);
        tracing::info!(
            output = %summary.output_path.display(),
            frames = summary.frames.len(),
            total_sec = summary.total_sec,
            elapsed_sec = summary.elapsed_sec,
            "run complete"
        );
        Ok(summary)
    }

    fn produce(
        &self,
        req: &RunRequest,
        stage: &mut Stage,
        created: &mut Created,
    ) -> SlidecastResult<RunSummary> {
        let cfg = &self.config;
        let transform = self.transform.as_ref();
        let cancel = &self.cancel;

        cancel.check()?;
        let images = discover_images(&req.working_dir)?;
        if images.is_empty() {
            return Err(SlidecastError::NoImages(req.working_dir.clone()));
        }
        let plan = pair_frames(images, req.captions.clone());
        if let Some(t) = &plan.truncation {
            tracing::warn!(
                images = t.images,
                captions = t.captions,
                kept = t.kept,
                "caption and image counts differ; truncating both to the shorter list"
            );
        }
        if plan.frames.is_empty() {
            return Err(SlidecastError::validation("no captions were supplied"));
        }

        enter(stage, Stage::ComputingTiming);
        let timing = TimingPlan::new(plan.frames.len(), cfg.display_duration_per_image)?;
        tracing::info!(
            frames = timing.frame_count,
            seconds_per_image = timing.seconds_per_image,
            total_sec = timing.total_sec,
            "timing fixed"
        );

        enter(stage, Stage::ConformingAudio);
        let audio = conform(&req.audio.path, timing.total_sec, transform, cancel)?;

        enter(stage, Stage::Compositing);
        let frames_dir = req.working_dir.join(&cfg.frames_dir_name);
        if frames_dir.exists() {
            tracing::warn!(dir = %frames_dir.display(), "removing stale frames directory");
            std::fs::remove_dir_all(&frames_dir).with_context(|| {
                format!("failed to clear frames directory '{}'", frames_dir.display())
            })?;
        }
        std::fs::create_dir_all(&frames_dir).with_context(|| {
            format!("failed to create frames directory '{}'", frames_dir.display())
        })?;
        created.frames_dir = Some(frames_dir.clone());

        let settings = ComposeSettings {
            canvas: cfg.canvas(),
            props: &cfg.caption,
            wrap_width: cfg.wrap_width,
            threads: cfg.threads,
        };
        compose_all(&plan.frames, &frames_dir, &settings, transform, cancel)?;

        enter(stage, Stage::Assembling);
        let output = output_path_for(
            &req.working_dir,
            &cfg.output_filename_pattern,
            &chrono::Local::now().naive_local(),
        );
        created.output = Some(output.clone());
        assemble(
            &frames_dir,
            &req.audio.path,
            &output,
            timing.seconds_per_image,
            transform,
            cancel,
        )?;

        Ok(RunSummary {
            working_dir: req.working_dir.clone(),
            frames: plan.frames,
            seconds_per_image: timing.seconds_per_image,
            total_sec: timing.total_sec,
            canvas: cfg.canvas(),
            caption: cfg.caption.clone(),
            audio_track_type: req.audio.track_type.clone(),
            audio_path: req.audio.path.clone(),
            audio,
            truncation: plan.truncation,
            output_path: output,
            elapsed_sec: 0.0,
        })
    }
}

fn enter(stage: &mut Stage, next: Stage) {
    *stage = next;
    tracing::info!(stage = %next, "stage");
}

fn discard(created: &Created) {
    let mut failures = Vec::new();
    if let Some(output) = &created.output
        && output.exists()
    {
        remove_artifact(output, false, &mut failures);
    }
    if let Some(dir) = &created.frames_dir {
        remove_artifact(dir, true, &mut failures);
    }
    for failure in failures {
        tracing::warn!(
            path = %failure.path.display(),
            error = %failure.message,
            "could not remove artifact of failed run"
        );
    }
}

fn remove_artifact(path: &Path, is_dir: bool, failures: &mut Vec<CleanupFailure>) {
    let removed = if is_dir {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match removed {
        Ok(()) => tracing::debug!(path = %path.display(), "removed"),
        Err(e) => failures.push(CleanupFailure {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/run.rs"]
mod tests;
