use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

use crate::foundation::core::Canvas;

/// Where a scaled source image lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Scaled width in pixels.
    pub width: u32,
    /// Scaled height in pixels.
    pub height: u32,
    /// Left padding in pixels.
    pub x: u32,
    /// Top padding in pixels.
    pub y: u32,
}

/// Fit `src_w x src_h` inside `canvas` preserving aspect ratio, centered.
///
/// The image is scaled by the smaller of the two axis ratios, so it never overflows or gets
/// cropped; the other axis is padded symmetrically. Sources smaller than the canvas are scaled
/// up until one axis touches the canvas edge.
pub fn fit_within(src_w: u32, src_h: u32, canvas: Canvas) -> Placement {
    let src_w = src_w.max(1);
    let src_h = src_h.max(1);
    let scale = (f64::from(canvas.width) / f64::from(src_w))
        .min(f64::from(canvas.height) / f64::from(src_h));

    let width = ((f64::from(src_w) * scale).round() as u32).clamp(1, canvas.width);
    let height = ((f64::from(src_h) * scale).round() as u32).clamp(1, canvas.height);

    Placement {
        width,
        height,
        x: (canvas.width - width) / 2,
        y: (canvas.height - height) / 2,
    }
}

/// Scale `src` into `canvas` and pad the remainder with opaque black.
///
/// Transparent source pixels are flattened over black.
pub fn letterbox(src: &DynamicImage, canvas: Canvas) -> RgbImage {
    let placement = fit_within(src.width(), src.height(), canvas);
    let rgba = src.to_rgba8();
    let scaled = if rgba.dimensions() == (placement.width, placement.height) {
        rgba
    } else {
        imageops::resize(&rgba, placement.width, placement.height, FilterType::Lanczos3)
    };

    let mut out = RgbImage::from_pixel(canvas.width, canvas.height, Rgb([0, 0, 0]));
    for (x, y, px) in scaled.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let a = u16::from(a);
        out.put_pixel(
            placement.x + x,
            placement.y + y,
            Rgb([over_black(r, a), over_black(g, a), over_black(b, a)]),
        );
    }
    out
}

fn over_black(c: u8, a: u16) -> u8 {
    ((u16::from(c) * a + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/caption/letterbox.rs"]
mod tests;
