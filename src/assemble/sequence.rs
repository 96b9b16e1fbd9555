use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::caption::compose::{FRAME_EXT, FRAME_PREFIX};
use crate::foundation::core::Framerate;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::media::process::CancelToken;
use crate::media::transform::{EncodeJob, MediaTransform};

/// Frames of `frame_dir` in ordinal order.
///
/// Only `image<NNNN>.png` names count, and their ordinals must run `0..n` without gaps. Ordering
/// comes from the ordinal alone, never from listing order or timestamps.
pub fn scan_frames(frame_dir: &Path) -> SlidecastResult<Vec<PathBuf>> {
    if !frame_dir.is_dir() {
        return Err(SlidecastError::NoFrames(frame_dir.to_path_buf()));
    }

    let mut frames = Vec::new();
    for entry in std::fs::read_dir(frame_dir)
        .with_context(|| format!("failed to list frame directory '{}'", frame_dir.display()))?
    {
        let path = entry
            .with_context(|| format!("failed to read entry in '{}'", frame_dir.display()))?
            .path();
        if let Some(ordinal) = frame_ordinal(&path) {
            frames.push((ordinal, path));
        }
    }
    if frames.is_empty() {
        return Err(SlidecastError::NoFrames(frame_dir.to_path_buf()));
    }

    frames.sort_by_key(|(ordinal, _)| *ordinal);
    for (expected, (ordinal, path)) in frames.iter().enumerate() {
        if *ordinal != expected {
            return Err(SlidecastError::validation(format!(
                "frame sequence in '{}' is not contiguous: expected ordinal {expected}, found '{}'",
                frame_dir.display(),
                path.display()
            )));
        }
    }
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}

/// Encode the frames of `frame_dir` with `audio` into `output`.
///
/// Each frame is held for `seconds_per_frame`. The encoder stops at the shorter of the two
/// streams, which are expected to match already.
#[tracing::instrument(skip(transform, cancel), fields(frames = tracing::field::Empty))]
pub fn assemble(
    frame_dir: &Path,
    audio: &Path,
    output: &Path,
    seconds_per_frame: f64,
    transform: &dyn MediaTransform,
    cancel: &CancelToken,
) -> SlidecastResult<()> {
    let framerate = Framerate::from_seconds_per_frame(seconds_per_frame)?;
    let frames = scan_frames(frame_dir)?;
    tracing::Span::current().record("frames", frames.len());

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }

    let pattern = frame_dir.join(format!("{FRAME_PREFIX}%04d.{FRAME_EXT}"));
    let job = EncodeJob {
        frame_pattern: &pattern,
        start_number: 0,
        frame_count: frames.len(),
        framerate,
        audio,
        output,
    };
    transform.encode_sequence(&job, cancel)?;
    tracing::info!(output = %output.display(), frames = frames.len(), %framerate, "video assembled");
    Ok(())
}

fn frame_ordinal(path: &Path) -> Option<usize> {
    if !path.is_file() {
        return None;
    }
    let name = path.file_name()?.to_str()?;
    let digits = name
        .strip_prefix(FRAME_PREFIX)?
        .strip_suffix(FRAME_EXT)?
        .strip_suffix('.')?;
    if digits.len() < 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/sequence.rs"]
mod tests;
