use std::path::Path;

use anyhow::Context as _;

use crate::caption::props::CaptionProperties;
use crate::caption::wrap::DEFAULT_WRAP_WIDTH;
use crate::foundation::core::{Canvas, Framerate};
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Default output width and height in pixels.
pub const DEFAULT_VIDEO_SIZE: u32 = 1080;
/// Default on-screen time per image in seconds.
pub const DEFAULT_DISPLAY_DURATION: f64 = 4.0;
/// Default output filename suffix.
pub const DEFAULT_OUTPUT_PATTERN: &str = "output_with_captions";
/// Default name of the temporary frames directory.
pub const DEFAULT_FRAMES_DIR: &str = "captioned_video_images";

/// Settings for a pipeline run. Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Output width in pixels (even).
    pub video_width: u32,
    /// Output height in pixels (even).
    pub video_height: u32,
    /// Seconds each image stays on screen.
    pub display_duration_per_image: f64,
    /// Output is written as `<YYYYMMDD_HHMMSS>_<pattern>.mp4`.
    pub output_filename_pattern: String,
    /// Caption styling.
    pub caption: CaptionProperties,
    /// Caption wrap width in characters.
    pub wrap_width: usize,
    /// Frames directory created inside the working directory.
    pub frames_dir_name: String,
    /// Compositing worker count; CPU count when unset.
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            video_width: DEFAULT_VIDEO_SIZE,
            video_height: DEFAULT_VIDEO_SIZE,
            display_duration_per_image: DEFAULT_DISPLAY_DURATION,
            output_filename_pattern: DEFAULT_OUTPUT_PATTERN.to_owned(),
            caption: CaptionProperties::default(),
            wrap_width: DEFAULT_WRAP_WIDTH,
            frames_dir_name: DEFAULT_FRAMES_DIR.to_owned(),
            threads: None,
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> SlidecastResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            SlidecastError::validation(format!("invalid config '{}': {e}", path.display()))
        })
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.video_width,
            height: self.video_height,
        }
    }

    /// Check every value range.
    pub fn validate(&self) -> SlidecastResult<()> {
        self.canvas().validate()?;
        let d = self.display_duration_per_image;
        if !d.is_finite() || d <= 0.0 {
            return Err(SlidecastError::validation(format!(
                "display_duration_per_image must be > 0 (got {d})"
            )));
        }
        // Must be encodable before any media is touched.
        Framerate::from_seconds_per_frame(d)?;
        check_file_component("output_filename_pattern", &self.output_filename_pattern)?;
        check_file_component("frames_dir_name", &self.frames_dir_name)?;
        if self.wrap_width == 0 {
            return Err(SlidecastError::validation("wrap_width must be > 0"));
        }
        if self.threads == Some(0) {
            return Err(SlidecastError::validation("threads must be >= 1 when set"));
        }
        self.caption.validate()
    }
}

fn check_file_component(field: &str, value: &str) -> SlidecastResult<()> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(SlidecastError::validation(format!(
            "{field} must be a plain file name (got '{value}')"
        )));
    }
    if value.contains(['/', '\\']) {
        return Err(SlidecastError::validation(format!(
            "{field} must not contain path separators (got '{value}')"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
