//! Caption compositing: styling, wrapping, letterboxing and per-frame rendering.

pub mod color;
pub mod compose;
pub mod letterbox;
pub mod props;
pub mod wrap;
