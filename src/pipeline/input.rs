use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Raster extensions picked up from the working directory (matched case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// One slot of the slideshow: an image, its caption and its position.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CaptionedFrame {
    /// Zero-based position; the only ordering key used for assembly.
    pub ordinal: usize,
    /// Source image.
    pub image: PathBuf,
    /// Caption text, unwrapped.
    pub caption: String,
}

/// Record of a caption/image count mismatch that was resolved by truncation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Truncation {
    /// Images found.
    pub images: usize,
    /// Captions supplied.
    pub captions: usize,
    /// Slots kept (the smaller of the two).
    pub kept: usize,
}

/// Frames ready for compositing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePlan {
    /// Frames with contiguous ordinals starting at 0.
    pub frames: Vec<CaptionedFrame>,
    /// Set when the inputs had different lengths.
    pub truncation: Option<Truncation>,
}

/// List the images in `dir`, ordered by lower-cased basename. Hidden files are skipped.
///
/// Directory listing order is platform dependent, so the result is always sorted here. Exact
/// basename breaks ties between names that differ only in case.
pub fn discover_images(dir: &Path) -> SlidecastResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SlidecastError::DirectoryMissing(dir.to_path_buf()));
    }

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to list working directory '{}'", dir.display()))?
    {
        let entry = entry.with_context(|| format!("failed to read entry in '{}'", dir.display()))?;
        let path = entry.path();
        if path.is_file() && !is_hidden(&path) && is_image(&path) {
            images.push(path);
        }
    }

    images.sort_by_cached_key(|p| {
        let name = basename(p);
        (name.to_lowercase(), name)
    });
    Ok(images)
}

/// Pair images with captions index by index.
///
/// When the counts differ, both lists are cut to the shorter length and the mismatch is
/// returned in [`FramePlan::truncation`].
pub fn pair_frames(images: Vec<PathBuf>, captions: Vec<String>) -> FramePlan {
    let truncation = (images.len() != captions.len()).then(|| Truncation {
        images: images.len(),
        captions: captions.len(),
        kept: images.len().min(captions.len()),
    });

    let frames = images
        .into_iter()
        .zip(captions)
        .enumerate()
        .map(|(ordinal, (image, caption))| CaptionedFrame {
            ordinal,
            image,
            caption,
        })
        .collect();

    FramePlan { frames, truncation }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|ok| e.eq_ignore_ascii_case(ok)))
}

/// Dotfiles (including macOS `._name` companions) are never slideshow images.
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/input.rs"]
mod tests;
