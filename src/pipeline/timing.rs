use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Video timing, fixed before any media work starts.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TimingPlan {
    /// Seconds each image is on screen.
    pub seconds_per_image: f64,
    /// Number of frames in the video.
    pub frame_count: usize,
    /// `seconds_per_image * frame_count`.
    pub total_sec: f64,
}

impl TimingPlan {
    /// Plan for `frame_count` images shown `seconds_per_image` each.
    pub fn new(frame_count: usize, seconds_per_image: f64) -> SlidecastResult<Self> {
        if frame_count == 0 {
            return Err(SlidecastError::validation("cannot time a video with no frames"));
        }
        if !seconds_per_image.is_finite() || seconds_per_image <= 0.0 {
            return Err(SlidecastError::validation(format!(
                "seconds per image must be > 0 (got {seconds_per_image})"
            )));
        }
        Ok(Self {
            seconds_per_image,
            frame_count,
            total_sec: seconds_per_image * frame_count as f64,
        })
    }
}
