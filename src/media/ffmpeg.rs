use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::caption::props::CaptionProperties;
use crate::foundation::core::Canvas;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::media::process::{CancelToken, run_tool};
use crate::media::transform::{CaptionJob, EncodeJob, MediaTransform};

/// [`MediaTransform`] backed by the system `ffmpeg` and `ffprobe` binaries.
///
/// We shell out rather than link libav so the crate builds without native FFmpeg headers.
#[derive(Clone, Debug)]
pub struct FfmpegTransform {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegTransform {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl FfmpegTransform {
    /// Use the binaries found on `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit binary locations.
    pub fn with_binaries(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn ffmpeg_cmd(&self, args: Vec<OsString>) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"])
            .args(args);
        cmd
    }
}

impl MediaTransform for FfmpegTransform {
    fn probe_duration(&self, path: &Path, cancel: &CancelToken) -> SlidecastResult<f64> {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path);

        let out = run_tool("ffprobe", cmd, cancel).map_err(|e| match e {
            SlidecastError::Encode { stderr, .. } => SlidecastError::unsupported(path, stderr),
            other => other,
        })?;
        parse_duration(&String::from_utf8_lossy(&out.stdout))
            .ok_or_else(|| SlidecastError::unsupported(path, "ffprobe reported no duration"))
    }

    fn trim_audio(
        &self,
        src: &Path,
        dst: &Path,
        seconds: f64,
        cancel: &CancelToken,
    ) -> SlidecastResult<()> {
        let out = run_tool("ffmpeg", self.ffmpeg_cmd(trim_args(src, dst, seconds)), cancel)?;
        log_warnings("ffmpeg", &out.stderr);
        Ok(())
    }

    fn draw_caption(&self, job: &CaptionJob<'_>, cancel: &CancelToken) -> SlidecastResult<()> {
        let filter = drawtext_filter(job.text_file, job.props, job.canvas);
        let mut args: Vec<OsString> = vec!["-i".into(), job.input.into()];
        args.extend([
            "-vf".into(),
            filter.into(),
            "-frames:v".into(),
            "1".into(),
            "-update".into(),
            "1".into(),
        ]);
        args.push(job.output.into());

        let out = run_tool("ffmpeg", self.ffmpeg_cmd(args), cancel)?;
        log_warnings("ffmpeg", &out.stderr);
        Ok(())
    }

    fn encode_sequence(&self, job: &EncodeJob<'_>, cancel: &CancelToken) -> SlidecastResult<()> {
        let out = run_tool("ffmpeg", self.ffmpeg_cmd(encode_args(job)), cancel)?;
        log_warnings("ffmpeg", &out.stderr);
        Ok(())
    }
}

/// Arguments for a stream-copy trim of the first audio stream to `[0, seconds)`.
pub fn trim_args(src: &Path, dst: &Path, seconds: f64) -> Vec<OsString> {
    vec![
        "-i".into(),
        src.into(),
        "-ss".into(),
        "0".into(),
        "-t".into(),
        format!("{seconds:.3}").into(),
        "-map".into(),
        "0:a:0".into(),
        "-c".into(),
        "copy".into(),
        dst.into(),
    ]
}

/// Arguments for muxing an image sequence with an audio track into an MP4.
///
/// h264 + yuv420p + AAC for broad playback compatibility; `-shortest` clamps to the shorter
/// stream.
pub fn encode_args(job: &EncodeJob<'_>) -> Vec<OsString> {
    vec![
        "-framerate".into(),
        job.framerate.to_string().into(),
        "-start_number".into(),
        job.start_number.to_string().into(),
        "-i".into(),
        job.frame_pattern.into(),
        "-i".into(),
        job.audio.into(),
        "-map".into(),
        "0:v:0".into(),
        "-map".into(),
        "1:a:0".into(),
        "-frames:v".into(),
        job.frame_count.to_string().into(),
        "-c:v".into(),
        "libx264".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-c:a".into(),
        "aac".into(),
        "-shortest".into(),
        "-movflags".into(),
        "+faststart".into(),
        job.output.into(),
    ]
}

/// `drawtext` filter that burns the caption from `text_file`.
///
/// Text is read from a file so captions never need filter-level quoting; `expansion=none` keeps
/// `%` literal.
pub fn drawtext_filter(text_file: &Path, props: &CaptionProperties, canvas: Canvas) -> String {
    let mut opts = vec![
        format!("textfile={}", escape_filter_value(&text_file.to_string_lossy())),
        "expansion=none".to_owned(),
        format!("fontsize={}", props.font_size),
        format!("fontcolor={}", props.font_color),
        "x=(w-tw)/2".to_owned(),
        format!("y={}", props.caption_offset_y.pixels(canvas.height)),
        "box=1".to_owned(),
        format!("boxcolor={}", props.box_color),
        format!("boxborderw={}", props.box_borderw),
        format!("line_spacing={}", props.line_spacing),
        "fix_bounds=1".to_owned(),
    ];
    if let Some(font) = &props.font_file {
        opts.push(format!(
            "fontfile={}",
            escape_filter_value(&font.to_string_lossy())
        ));
    }
    format!("drawtext={}", opts.join(":"))
}

/// Escape a value for use as a filter option inside a `-vf` filtergraph.
///
/// Two levels apply: the option parser splits on `:` outside single quotes, and the graph parser
/// strips one level of quoting and backslashes first. The value is single-quoted for the option
/// level (with `'` written as `'\''`), then the graph-level specials are backslash-escaped.
/// Backslashes in paths become `/`.
pub fn escape_filter_value(value: &str) -> String {
    let normalized = value.replace('\\', "/");
    let quoted = format!("'{}'", normalized.replace('\'', "'\\''"));
    let mut escaped = String::with_capacity(quoted.len() + 8);
    for ch in quoted.chars() {
        match ch {
            '\\' | '\'' | '[' | ']' | ',' | ';' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn parse_duration(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .and_then(|l| l.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

fn log_warnings(tool: &str, stderr: &[u8]) {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if !text.is_empty() {
        tracing::debug!(tool, stderr = %text, "tool diagnostics");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
