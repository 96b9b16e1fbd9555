use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::caption::letterbox::letterbox;
use crate::caption::props::CaptionProperties;
use crate::caption::wrap::wrap_caption;
use crate::foundation::core::Canvas;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::media::process::CancelToken;
use crate::media::transform::{CaptionJob, MediaTransform};
use crate::pipeline::input::CaptionedFrame;

/// Filename prefix of composited frames.
pub const FRAME_PREFIX: &str = "image";
/// Extension of composited frames.
pub const FRAME_EXT: &str = "png";

/// Everything a frame needs besides its own image and caption.
#[derive(Clone, Copy, Debug)]
pub struct ComposeSettings<'a> {
    /// Output size of every frame.
    pub canvas: Canvas,
    /// Caption styling.
    pub props: &'a CaptionProperties,
    /// Wrap width in characters.
    pub wrap_width: usize,
    /// Worker threads for [`compose_all`]; CPU count when `None`.
    pub threads: Option<usize>,
}

/// Name of the composited frame with ordinal `ordinal` (`image0000.png`, ...).
pub fn frame_file_name(ordinal: usize) -> String {
    format!("{FRAME_PREFIX}{ordinal:04}.{FRAME_EXT}")
}

/// Composite one frame into `out_dir`, returning the written path.
///
/// The source is letterboxed onto a black canvas in-process, then the wrapped caption is burned
/// in by `transform`. The source image is only read.
#[tracing::instrument(skip_all, fields(ordinal = frame.ordinal))]
pub fn compose(
    frame: &CaptionedFrame,
    out_dir: &Path,
    settings: &ComposeSettings<'_>,
    transform: &dyn MediaTransform,
    cancel: &CancelToken,
) -> SlidecastResult<PathBuf> {
    let idx = frame.ordinal;
    cancel.check()?;
    tracing::debug!(image = %frame.image.display(), caption = %frame.caption, "compositing");

    let src = image::open(&frame.image).map_err(|e| {
        SlidecastError::composition(idx, format!("decode '{}': {e}", frame.image.display()))
    })?;
    let boxed = letterbox(&src, settings.canvas);

    let output = out_dir.join(frame_file_name(idx));
    let wrapped = wrap_caption(&frame.caption, settings.wrap_width);
    if wrapped.is_empty() {
        boxed
            .save_with_format(&output, image::ImageFormat::Png)
            .map_err(|e| SlidecastError::composition(idx, format!("write frame: {e}")))?;
        return Ok(output);
    }

    let base = out_dir.join(format!("{FRAME_PREFIX}{idx:04}.base.{FRAME_EXT}"));
    let text_file = out_dir.join(format!("{FRAME_PREFIX}{idx:04}.txt"));
    boxed
        .save_with_format(&base, image::ImageFormat::Png)
        .map_err(|e| SlidecastError::composition(idx, format!("write letterboxed frame: {e}")))?;
    std::fs::write(&text_file, wrapped.as_bytes())
        .map_err(|e| SlidecastError::composition(idx, format!("write caption text: {e}")))?;

    let job = CaptionJob {
        input: &base,
        text_file: &text_file,
        output: &output,
        canvas: settings.canvas,
        props: settings.props,
    };
    let drawn = transform.draw_caption(&job, cancel);
    for scratch in [&base, &text_file] {
        if let Err(e) = std::fs::remove_file(scratch) {
            tracing::debug!(path = %scratch.display(), error = %e, "scratch file left behind");
        }
    }
    drawn.map_err(|e| match e {
        SlidecastError::Cancelled | SlidecastError::ToolMissing(_) => e,
        other => SlidecastError::composition(idx, other.to_string()),
    })?;

    let (w, h) = image::image_dimensions(&output)
        .map_err(|e| SlidecastError::composition(idx, format!("read back frame: {e}")))?;
    if (w, h) != (settings.canvas.width, settings.canvas.height) {
        return Err(SlidecastError::composition(
            idx,
            format!("frame is {w}x{h}, expected {}", settings.canvas),
        ));
    }
    Ok(output)
}

/// Composite every frame into `out_dir` on a worker pool.
///
/// All frames succeed or the batch fails. The first failure cancels outstanding work (and kills
/// in-flight tool processes); the error reported is the one with the lowest ordinal. Returned
/// paths are in ordinal order.
pub fn compose_all(
    frames: &[CaptionedFrame],
    out_dir: &Path,
    settings: &ComposeSettings<'_>,
    transform: &dyn MediaTransform,
    cancel: &CancelToken,
) -> SlidecastResult<Vec<PathBuf>> {
    let pool = build_thread_pool(settings.threads)?;
    let batch = cancel.child();

    let results: Vec<SlidecastResult<PathBuf>> = pool.install(|| {
        frames
            .par_iter()
            .map(|frame| {
                let res = compose(frame, out_dir, settings, transform, &batch);
                if res.is_err() {
                    batch.cancel();
                }
                res
            })
            .collect()
    });

    if cancel.is_cancelled() {
        return Err(SlidecastError::Cancelled);
    }

    let mut paths = Vec::with_capacity(results.len());
    let mut first_cancelled = None;
    for res in results {
        match res {
            Ok(path) => paths.push(path),
            Err(SlidecastError::Cancelled) => {
                first_cancelled.get_or_insert(SlidecastError::Cancelled);
            }
            Err(e) => return Err(e),
        }
    }
    match first_cancelled {
        Some(e) => Err(e),
        None => Ok(paths),
    }
}

fn build_thread_pool(threads: Option<usize>) -> SlidecastResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SlidecastError::validation(
            "compositing 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("compose-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        SlidecastError::Other(anyhow::anyhow!("failed to build compositing pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/caption/compose.rs"]
mod tests;
