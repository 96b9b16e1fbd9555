use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Output canvas size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas, rejecting sizes the encoder cannot take.
    pub fn new(width: u32, height: u32) -> SlidecastResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    /// Check the canvas is non-empty and even on both axes.
    pub fn validate(self) -> SlidecastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SlidecastError::validation(
                "video width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // yuv420p subsamples chroma 2x2.
            return Err(SlidecastError::validation(format!(
                "video width/height must be even (got {}x{}, required for yuv420p mp4 output)",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Frames-per-second represented as a reduced rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Framerate {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), non-zero.
    pub den: u32,
}

impl Framerate {
    /// Rate at which each frame is shown for `seconds` seconds (`1 / seconds`).
    ///
    /// The duration is resolved to whole milliseconds.
    pub fn from_seconds_per_frame(seconds: f64) -> SlidecastResult<Self> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(SlidecastError::validation(format!(
                "seconds per frame must be a positive number (got {seconds})"
            )));
        }
        let millis = (seconds * 1000.0).round();
        if millis < 1.0 || millis > f64::from(u32::MAX) {
            return Err(SlidecastError::validation(format!(
                "seconds per frame {seconds} is outside the supported millisecond range"
            )));
        }
        let millis = millis as u32;
        let g = gcd(1000, millis);
        Ok(Self {
            num: 1000 / g,
            den: millis / g,
        })
    }

    /// Seconds each frame is on screen.
    pub fn frame_period_sec(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }
}

impl std::fmt::Display for Framerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
