use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::caption::color::CaptionColor;
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Default caption font size in pixels.
pub const DEFAULT_FONT_SIZE: u32 = 36;
/// Default caption offset, as a fraction of canvas height from the top.
pub const DEFAULT_CAPTION_OFFSET: f64 = 0.10;
/// Default padding between the text and the edge of its box, in pixels.
pub const DEFAULT_BOX_BORDER: u32 = 5;
/// Default extra spacing between caption lines, in pixels.
pub const DEFAULT_LINE_SPACING: u32 = 10;

/// Styling for the burned-in caption.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionProperties {
    /// Font size in pixels.
    pub font_size: u32,
    /// Text color.
    pub font_color: CaptionColor,
    /// Vertical position of the caption's top edge.
    pub caption_offset_y: CaptionOffset,
    /// Color (usually semi-opaque) of the box behind the text.
    pub box_color: CaptionColor,
    /// Padding around the text inside the box, in pixels.
    pub box_borderw: u32,
    /// Extra spacing between lines, in pixels.
    pub line_spacing: u32,
    /// Font file for the text renderer; the renderer's default font when unset.
    pub font_file: Option<PathBuf>,
}

impl Default for CaptionProperties {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_color: CaptionColor::rgb(255, 255, 255),
            caption_offset_y: CaptionOffset(DEFAULT_CAPTION_OFFSET),
            box_color: CaptionColor::rgb(0, 0, 0).with_alpha(0.5),
            box_borderw: DEFAULT_BOX_BORDER,
            line_spacing: DEFAULT_LINE_SPACING,
            font_file: None,
        }
    }
}

impl CaptionProperties {
    /// Check value ranges.
    pub fn validate(&self) -> SlidecastResult<()> {
        if self.font_size == 0 {
            return Err(SlidecastError::validation("caption font_size must be > 0"));
        }
        if let Some(font) = &self.font_file
            && !font.is_file()
        {
            return Err(SlidecastError::validation(format!(
                "caption font_file '{}' does not exist",
                font.display()
            )));
        }
        Ok(())
    }
}

/// Vertical caption offset as a fraction of canvas height, in `[0, 1]`.
///
/// Written as `"0.10*h"`, `"10%"` or a bare fraction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OffsetRepr", into = "String")]
pub struct CaptionOffset(f64);

impl CaptionOffset {
    /// Offset from a fraction in `[0, 1]`.
    pub fn new(fraction: f64) -> SlidecastResult<Self> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(SlidecastError::validation(format!(
                "caption offset must be within [0, 1] of the canvas height (got {fraction})"
            )));
        }
        Ok(Self(fraction))
    }

    /// Fraction of canvas height.
    pub fn fraction(self) -> f64 {
        self.0
    }

    /// Pixel row for a canvas of `height` pixels.
    pub fn pixels(self, height: u32) -> u32 {
        (self.0 * f64::from(height)).round() as u32
    }
}

impl FromStr for CaptionOffset {
    type Err = SlidecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let bad = || SlidecastError::validation(format!("invalid caption offset \"{s}\""));

        let fraction = if let Some(pct) = compact.strip_suffix('%') {
            pct.parse::<f64>().map_err(|_| bad())? / 100.0
        } else if let Some(f) = compact
            .strip_suffix("*h")
            .or_else(|| compact.strip_suffix("*H"))
        {
            f.parse::<f64>().map_err(|_| bad())?
        } else {
            compact.parse::<f64>().map_err(|_| bad())?
        };
        Self::new(fraction)
    }
}

impl std::fmt::Display for CaptionOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*h", self.0)
    }
}

impl From<CaptionOffset> for String {
    fn from(value: CaptionOffset) -> Self {
        value.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OffsetRepr {
    Fraction(f64),
    Expr(String),
}

impl TryFrom<OffsetRepr> for CaptionOffset {
    type Error = SlidecastError;

    fn try_from(value: OffsetRepr) -> Result<Self, Self::Error> {
        match value {
            OffsetRepr::Fraction(f) => Self::new(f),
            OffsetRepr::Expr(s) => s.parse(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/caption/props.rs"]
mod tests;
