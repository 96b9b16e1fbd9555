use std::path::Path;

use crate::caption::props::CaptionProperties;
use crate::foundation::core::{Canvas, Framerate};
use crate::foundation::error::SlidecastResult;
use crate::media::process::CancelToken;

/// Burn a caption onto an already letterboxed canvas image.
#[derive(Clone, Copy, Debug)]
pub struct CaptionJob<'a> {
    /// Letterboxed input image, exactly `canvas` sized.
    pub input: &'a Path,
    /// UTF-8 file holding the wrapped caption (lines separated by `\n`).
    pub text_file: &'a Path,
    /// Output image path.
    pub output: &'a Path,
    /// Canvas size of both input and output.
    pub canvas: Canvas,
    /// Text and box styling.
    pub props: &'a CaptionProperties,
}

/// Encode a numbered image sequence plus one audio track into a container.
#[derive(Clone, Copy, Debug)]
pub struct EncodeJob<'a> {
    /// printf-style sequence pattern, e.g. `frames/image%04d.png`.
    pub frame_pattern: &'a Path,
    /// First ordinal in the sequence.
    pub start_number: u32,
    /// Number of frames in the sequence.
    pub frame_count: usize,
    /// Input rate of the sequence; `1 / seconds_per_frame`.
    pub framerate: Framerate,
    /// Length-matched audio track.
    pub audio: &'a Path,
    /// Output container path.
    pub output: &'a Path,
}

/// Media capabilities the pipeline depends on.
///
/// The pipeline only talks to this trait; [`FfmpegTransform`](crate::FfmpegTransform) is the
/// production implementation. Every call is blocking and must stop early once `cancel` fires.
pub trait MediaTransform: Send + Sync {
    /// Duration in seconds of a container the crate cannot read in-process.
    fn probe_duration(&self, path: &Path, cancel: &CancelToken) -> SlidecastResult<f64>;

    /// Copy `[0, seconds)` of `src` into `dst` without re-encoding.
    fn trim_audio(
        &self,
        src: &Path,
        dst: &Path,
        seconds: f64,
        cancel: &CancelToken,
    ) -> SlidecastResult<()>;

    /// Render `job.text_file` onto `job.input`, writing `job.output`.
    fn draw_caption(&self, job: &CaptionJob<'_>, cancel: &CancelToken) -> SlidecastResult<()>;

    /// Encode the frame sequence with the audio track into `job.output`.
    fn encode_sequence(&self, job: &EncodeJob<'_>, cancel: &CancelToken) -> SlidecastResult<()>;
}
