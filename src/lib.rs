//! Slidecast turns a directory of still images, a caption list and a background track into a
//! captioned slideshow MP4.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: discover images (sorted by basename) and pair them with captions
//! 2. **Time**: `frames x seconds_per_image` fixes the video length
//! 3. **Conform audio**: trim the track in place to exactly that length (never pad)
//! 4. **Composite**: letterbox every image onto the canvas and burn in its wrapped caption
//! 5. **Assemble**: encode the numbered frames with the audio into an MP4
//! 6. **Clean up**: remove the frames directory and the conformed audio
//!
//! Media work goes through the [`MediaTransform`] trait; [`FfmpegTransform`] implements it with
//! the system `ffmpeg`/`ffprobe` binaries.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **All or nothing**: a failed run leaves no frames directory and no partial video behind.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assemble;
mod audio;
mod caption;
mod foundation;
mod media;
mod pipeline;

pub use assemble::sequence::{assemble, scan_frames};
pub use audio::conform::{ConformOutcome, DURATION_EPSILON_SEC, conform};
pub use caption::color::CaptionColor;
pub use caption::compose::{ComposeSettings, compose, compose_all, frame_file_name};
pub use caption::letterbox::{Placement, fit_within, letterbox};
pub use caption::props::{CaptionOffset, CaptionProperties};
pub use caption::wrap::{DEFAULT_WRAP_WIDTH, wrap_caption};
pub use foundation::core::{Canvas, Framerate};
pub use foundation::error::{ErrorKind, SlidecastError, SlidecastResult};
pub use media::ffmpeg::{
    FfmpegTransform, drawtext_filter, encode_args, escape_filter_value, trim_args,
};
pub use media::probe::{AudioFormat, MediaAsset, probe};
pub use media::process::{CancelToken, ToolOutput, is_tool_on_path, run_tool};
pub use media::transform::{CaptionJob, EncodeJob, MediaTransform};
pub use pipeline::config::PipelineConfig;
pub use pipeline::input::{
    CaptionedFrame, FramePlan, IMAGE_EXTENSIONS, Truncation, discover_images, pair_frames,
};
pub use pipeline::run::{
    AudioTrack, CleanupFailure, Pipeline, RunRequest, RunSummary, Stage, output_path_for,
};
pub use pipeline::timing::TimingPlan;
